//! Fixed enumerations for the categorical profile attributes.
//!
//! Wire names are kebab-case and match the values persisted by the profile
//! quiz. Parsing is case-insensitive; anything outside the enumeration is an
//! [`MatchError::InvalidInput`].

use crate::error::MatchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! categorical_attribute {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire $(, alias = $alias)*)]
                $variant,
            )+
        }

        impl $name {
            /// Every value, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Record field this enumeration is read from
            pub const FIELD: &'static str = $field;

            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = MatchError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($wire $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(MatchError::unknown_variant(Self::FIELD, s)),
                }
            }
        }
    };
}

categorical_attribute! {
    /// Self-described gender
    #[derive(Default)]
    Gender, "gender" {
        Male => "male",
        Female => "female",
        NonBinary => "non-binary",
        #[default]
        Unspecified => "unspecified" | "prefer-not-to-say",
    }
}

categorical_attribute! {
    /// Which gender a profile wants to live with
    GenderPreference, "preferredGender" {
        Male => "male",
        Female => "female",
        Any => "any" | "no-preference",
        SameGender => "same-gender",
    }
}

categorical_attribute! {
    SleepSchedule, "sleepSchedule" {
        EarlyBird => "early-bird",
        NightOwl => "night-owl",
        Flexible => "flexible",
    }
}

categorical_attribute! {
    SocialLevel, "socialLevel" {
        PreferQuiet => "prefer-quiet",
        ModeratelySocial => "moderately-social",
        VerySocial => "very-social",
    }
}

categorical_attribute! {
    Cleanliness, "cleanlinessLevel" {
        Relaxed => "relaxed",
        ModeratelyClean => "moderately-clean",
        VeryClean => "very-clean",
    }
}

categorical_attribute! {
    SmokingTolerance, "smokingTolerance" {
        NoSmoking => "no-smoking",
        OutdoorOnly => "outdoor-only",
        Anywhere => "anywhere",
    }
}

categorical_attribute! {
    DrinkingHabits, "drinkingHabits" {
        NonDrinker => "non-drinker",
        SocialDrinker => "social-drinker",
        RegularDrinker => "regular-drinker",
    }
}

categorical_attribute! {
    PetPreference, "petPreference" {
        NoPets => "no-pets",
        OkayWithPets => "okay-with-pets",
        LovePets => "love-pets",
    }
}

categorical_attribute! {
    StudyHabits, "studyHabits" {
        QuietStudier => "quiet-studier",
        GroupStudier => "group-studier",
        Flexible => "flexible",
    }
}

categorical_attribute! {
    WorkFromHome, "workFromHome" {
        Never => "never",
        Sometimes => "sometimes",
        Always => "always",
    }
}

categorical_attribute! {
    GuestPolicy, "guestPolicy" {
        RareGuests => "rare-guests",
        OccasionalGuests => "occasional-guests",
        FrequentGuests => "frequent-guests",
    }
}
