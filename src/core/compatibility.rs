//! Categorical compatibility rules.
//!
//! Every attribute carries its rule as data ([`CompatibilityRule`]), so the
//! tables can be inspected and tested on their own and a single evaluator
//! scores all of them. Scores are in `[0, 1]`; equal values always score 1.

use crate::models::{
    Cleanliness, DrinkingHabits, Gender, GenderPreference, GuestPolicy, PetPreference, SleepSchedule,
    SmokingTolerance, SocialLevel, StudyHabits, WorkFromHome,
};

/// Penalty per rank step on the cleanliness scale
pub const CLEANLINESS_PENALTY_PER_STEP: f64 = 0.4;
/// Penalty per rank step on the guest-policy scale
pub const GUEST_PENALTY_PER_STEP: f64 = 0.35;
/// Penalty per rank step on the social-level scale
pub const SOCIAL_PENALTY_PER_STEP: f64 = 0.2;

/// How two values of one attribute are compared
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompatibilityRule<T: 'static> {
    /// Values sit on an ordered scale: `max(0, 1 - |rank_a - rank_b| * penalty_per_step)`
    Ordinal {
        scale: &'static [T],
        penalty_per_step: f64,
    },
    /// Symmetric lookup of partial credit for specific unequal pairs
    Pairwise {
        pairs: &'static [(T, T, f64)],
        otherwise: f64,
    },
    /// Either side holding the wildcard is a full match
    Wildcard { wildcard: T, otherwise: f64 },
}

impl<T: Copy + PartialEq + 'static> CompatibilityRule<T> {
    pub fn score(&self, a: T, b: T) -> f64 {
        if a == b {
            return 1.0;
        }

        match *self {
            Self::Ordinal { scale, penalty_per_step } => {
                let rank = |v: T| scale.iter().position(|s| *s == v);
                match (rank(a), rank(b)) {
                    (Some(ra), Some(rb)) => {
                        let steps = ra.abs_diff(rb) as f64;
                        (1.0 - steps * penalty_per_step).max(0.0)
                    }
                    // A value missing from its own scale is a table bug; treat as furthest apart
                    _ => 0.0,
                }
            }
            Self::Pairwise { pairs, otherwise } => pairs
                .iter()
                .find(|(x, y, _)| (*x == a && *y == b) || (*x == b && *y == a))
                .map_or(otherwise, |(_, _, score)| *score),
            Self::Wildcard { wildcard, otherwise } => {
                if a == wildcard || b == wildcard {
                    1.0
                } else {
                    otherwise
                }
            }
        }
    }
}

/// A categorical attribute with a fixed compatibility rule
pub trait Categorical: Copy + PartialEq + 'static {
    const RULE: CompatibilityRule<Self>;
}

/// Score two values of the same attribute
#[inline]
pub fn compatibility<T: Categorical>(a: T, b: T) -> f64 {
    T::RULE.score(a, b)
}

/// Score two optional values; `None` when either side is unset
#[inline]
pub fn optional_compatibility<T: Categorical>(a: Option<T>, b: Option<T>) -> Option<f64> {
    Some(compatibility(a?, b?))
}

impl Categorical for Cleanliness {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Ordinal {
        scale: &[Self::Relaxed, Self::ModeratelyClean, Self::VeryClean],
        penalty_per_step: CLEANLINESS_PENALTY_PER_STEP,
    };
}

impl Categorical for GuestPolicy {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Ordinal {
        scale: &[Self::RareGuests, Self::OccasionalGuests, Self::FrequentGuests],
        penalty_per_step: GUEST_PENALTY_PER_STEP,
    };
}

impl Categorical for SocialLevel {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Ordinal {
        scale: &[Self::PreferQuiet, Self::ModeratelySocial, Self::VerySocial],
        penalty_per_step: SOCIAL_PENALTY_PER_STEP,
    };
}

impl Categorical for SmokingTolerance {
    // no-smoking against anywhere falls through to 0: a hard conflict
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Pairwise {
        pairs: &[
            (Self::NoSmoking, Self::OutdoorOnly, 0.7),
            (Self::OutdoorOnly, Self::Anywhere, 0.7),
        ],
        otherwise: 0.0,
    };
}

impl Categorical for PetPreference {
    // no-pets against any accepting value falls through to 0
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Pairwise {
        pairs: &[(Self::LovePets, Self::OkayWithPets, 0.8)],
        otherwise: 0.0,
    };
}

impl Categorical for DrinkingHabits {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Pairwise {
        pairs: &[
            (Self::SocialDrinker, Self::NonDrinker, 0.7),
            (Self::SocialDrinker, Self::RegularDrinker, 0.7),
        ],
        otherwise: 0.4,
    };
}

impl Categorical for WorkFromHome {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Pairwise {
        pairs: &[
            (Self::Sometimes, Self::Never, 0.7),
            (Self::Sometimes, Self::Always, 0.7),
        ],
        otherwise: 0.4,
    };
}

impl Categorical for SleepSchedule {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Wildcard {
        wildcard: Self::Flexible,
        otherwise: 0.3,
    };
}

impl Categorical for StudyHabits {
    const RULE: CompatibilityRule<Self> = CompatibilityRule::Wildcard {
        wildcard: Self::Flexible,
        otherwise: 0.5,
    };
}

/// Whether `preference`, held by someone of gender `own`, accepts `other`
#[inline]
pub fn preference_satisfied(preference: GenderPreference, own: Gender, other: Gender) -> bool {
    match preference {
        GenderPreference::Any => true,
        GenderPreference::SameGender => own == other,
        GenderPreference::Male => other == Gender::Male,
        GenderPreference::Female => other == Gender::Female,
    }
}

/// Mutual gender-preference score
///
/// Both preferences stated: 1.0 when both are satisfied, 0.5 for one, 0.0
/// for neither. Only one stated: 1.0 or 0.0 on that side alone. Neither
/// stated: `None`, the factor is skipped.
pub fn gender_compatibility(
    gender_a: Gender,
    preference_a: Option<GenderPreference>,
    gender_b: Gender,
    preference_b: Option<GenderPreference>,
) -> Option<f64> {
    let satisfied_a = preference_a.map(|p| preference_satisfied(p, gender_a, gender_b));
    let satisfied_b = preference_b.map(|p| preference_satisfied(p, gender_b, gender_a));

    match (satisfied_a, satisfied_b) {
        (None, None) => None,
        (Some(true), Some(true)) => Some(1.0),
        (Some(true), Some(false)) | (Some(false), Some(true)) => Some(0.5),
        (Some(false), Some(false)) => Some(0.0),
        (Some(one), None) | (None, Some(one)) => Some(if one { 1.0 } else { 0.0 }),
    }
}
