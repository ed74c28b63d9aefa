//! Text-based place matching for profiles without coordinates.
//!
//! The taxonomy is process-wide read-only data: cities with their sub-areas
//! and state, a region adjacency table, and a zone grouping of states. The
//! built-in table covers the major Nigerian cities; a custom taxonomy can be
//! deserialized and handed to the engine instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, LazyLock};

/// Score for an identical place name
pub const EXACT_PLACE_SCORE: f64 = 1.0;
/// Score for two places in the same city
pub const SAME_CITY_SCORE: f64 = 0.85;
/// Score for places in neighbouring regions
pub const ADJACENT_REGION_SCORE: f64 = 0.6;
/// Score for places in the same zone
pub const SAME_ZONE_SCORE: f64 = 0.4;
/// Floor for unrelated places; never zero, text data is often imprecise
pub const UNRELATED_PLACE_SCORE: f64 = 0.2;

/// Default cap on [`LocationTaxonomy::suggest`] results
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

const CITIES: &[(&str, &str, &[&str])] = &[
    ("Lagos", "lagos", &["Victoria Island", "Ikoyi", "Lekki", "Ikeja", "Surulere", "Yaba", "Ajah", "Magodo", "Gbagada", "Festac"]),
    ("Abuja", "abuja", &["Wuse", "Maitama", "Asokoro", "Garki", "Gwarinpa", "Kubwa", "Nyanya", "Karu", "Lugbe", "Jahi"]),
    ("Port Harcourt", "rivers", &["GRA", "Old GRA", "D-Line", "Rumuola", "Eliozu", "Rumuokwurushi", "Trans Amadi", "Mile 3"]),
    ("Kano", "kano", &["Fagge", "Nasarawa", "Gwale", "Kumbotso", "Ungogo", "Dala", "Tarauni", "Municipal"]),
    ("Ibadan", "oyo", &["Bodija", "UI", "Dugbe", "Ring Road", "Mokola", "Agodi", "Iyaganku", "Oluyole"]),
    ("Kaduna", "kaduna", &["GRA", "Barnawa", "Malali", "Sabon Tasha", "Ungwan Rimi", "Television", "Narayi"]),
    ("Benin City", "edo", &["GRA", "Ikpoba Hill", "New Benin", "Ring Road", "Ugbowo", "Upper Sakponba"]),
    ("Jos", "plateau", &["Rayfield", "Bukuru", "Rantya", "Lamingo", "Jos North", "Plateau"]),
    ("Warri", "delta", &["GRA", "Effurun", "Ekpan", "PTI Road", "NPA", "Jeddo"]),
    ("Enugu", "enugu", &["GRA", "Independence Layout", "New Haven", "Trans Ekulu", "Achara Layout", "Coal Camp"]),
];

const ADJACENCY: &[(&str, &[&str])] = &[
    ("lagos", &["ogun", "oyo"]),
    ("abuja", &["niger", "kaduna", "kogi", "nasarawa"]),
    ("kano", &["kaduna", "jigawa", "katsina"]),
    ("ibadan", &["lagos", "ogun", "osun"]),
    ("port harcourt", &["rivers", "bayelsa", "akwa ibom"]),
];

const ZONES: &[(&str, &[&str])] = &[
    ("south-west", &["lagos", "ogun", "oyo", "osun", "ondo", "ekiti"]),
    ("north-central", &["abuja", "niger", "kogi", "kwara", "nasarawa", "plateau", "benue"]),
    ("north-west", &["kaduna", "kano", "katsina", "kebbi", "sokoto", "zamfara", "jigawa"]),
    ("north-east", &["borno", "yobe", "bauchi", "gombe", "adamawa", "taraba"]),
    ("south-east", &["enugu", "anambra", "imo", "abia", "ebonyi"]),
    ("south-south", &["rivers", "bayelsa", "akwa ibom", "cross river", "delta", "edo"]),
];

static BUILTIN: LazyLock<Arc<LocationTaxonomy>> = LazyLock::new(|| Arc::new(LocationTaxonomy::nigeria()));

/// A city with the sub-areas that belong to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub state: String,
    #[serde(default)]
    pub areas: Vec<String>,
}

/// A named group of regions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionGroup {
    pub name: String,
    pub members: Vec<String>,
}

/// How closely two place names are related
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlaceMatch {
    Unrelated,
    SameZone,
    Adjacent,
    SameCity,
    Exact,
}

impl PlaceMatch {
    pub const fn score(self) -> f64 {
        match self {
            Self::Exact => EXACT_PLACE_SCORE,
            Self::SameCity => SAME_CITY_SCORE,
            Self::Adjacent => ADJACENT_REGION_SCORE,
            Self::SameZone => SAME_ZONE_SCORE,
            Self::Unrelated => UNRELATED_PLACE_SCORE,
        }
    }
}

/// Static region/sub-area/zone tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationTaxonomy {
    pub cities: Vec<City>,
    /// Region name to the regions that border it
    #[serde(default)]
    pub adjacency: Vec<RegionGroup>,
    #[serde(default)]
    pub zones: Vec<RegionGroup>,
}

/// What a free-text place name resolves to
#[derive(Debug, Default)]
struct PlaceKeys {
    cities: BTreeSet<usize>,
    /// Lowercase region names: mentioned terms plus resolved city and state names
    regions: BTreeSet<String>,
}

impl LocationTaxonomy {
    /// Shared handle to the built-in table, built on first use
    pub fn builtin() -> Arc<Self> {
        Arc::clone(&BUILTIN)
    }

    /// The Nigerian city table the app launched with
    pub fn nigeria() -> Self {
        let group = |(name, members): &(&str, &[&str])| RegionGroup {
            name: (*name).to_string(),
            members: members.iter().map(|m| (*m).to_string()).collect(),
        };

        Self {
            cities: CITIES
                .iter()
                .map(|(name, state, areas)| City {
                    name: (*name).to_string(),
                    state: (*state).to_string(),
                    areas: areas.iter().map(|a| (*a).to_string()).collect(),
                })
                .collect(),
            adjacency: ADJACENCY.iter().map(group).collect(),
            zones: ZONES.iter().map(group).collect(),
        }
    }

    /// Classify the relationship between two free-text place names
    pub fn compare(&self, a: &str, b: &str) -> PlaceMatch {
        if normalize(a) == normalize(b) {
            return PlaceMatch::Exact;
        }

        let keys_a = self.resolve(a);
        let keys_b = self.resolve(b);

        if !keys_a.cities.is_disjoint(&keys_b.cities) {
            return PlaceMatch::SameCity;
        }

        let borders = |from: &PlaceKeys, to: &PlaceKeys| {
            self.adjacency.iter().any(|group| {
                from.regions.contains(&normalize(&group.name))
                    && group.members.iter().any(|m| to.regions.contains(&normalize(m)))
            })
        };
        if borders(&keys_a, &keys_b) || borders(&keys_b, &keys_a) {
            return PlaceMatch::Adjacent;
        }

        let same_zone = self.zones.iter().any(|zone| {
            let in_zone = |keys: &PlaceKeys| zone.members.iter().any(|m| keys.regions.contains(&normalize(m)));
            in_zone(&keys_a) && in_zone(&keys_b)
        });
        if same_zone {
            return PlaceMatch::SameZone;
        }

        PlaceMatch::Unrelated
    }

    /// Cities and "Area, City" strings containing `query`, case-insensitively
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        let mut suggestions = Vec::new();

        for city in &self.cities {
            if city.name.to_lowercase().contains(&needle) {
                suggestions.push(city.name.clone());
            }
            for area in &city.areas {
                if area.to_lowercase().contains(&needle) {
                    suggestions.push(format!("{area}, {}", city.name));
                }
            }
        }

        suggestions.truncate(limit);
        suggestions
    }

    /// Resolve a place to cities and region names
    ///
    /// Cities named outright win. Otherwise a sub-area resolves only when it
    /// belongs to exactly one city, so a bare "GRA" stays unresolved.
    fn resolve(&self, place: &str) -> PlaceKeys {
        let tokens = tokenize(place);
        let mut keys = PlaceKeys::default();

        for (idx, city) in self.cities.iter().enumerate() {
            if mentions(&tokens, &city.name) {
                keys.cities.insert(idx);
            }
        }

        if keys.cities.is_empty() {
            let mut area_hits: Vec<usize> = Vec::new();
            let mut ambiguous = BTreeSet::new();
            for (idx, city) in self.cities.iter().enumerate() {
                for area in city.areas.iter().filter(|area| mentions(&tokens, area)) {
                    let owners = self.cities.iter().filter(|c| c.areas.iter().any(|a| normalize(a) == normalize(area))).count();
                    if owners == 1 {
                        area_hits.push(idx);
                    } else {
                        ambiguous.insert(normalize(area));
                    }
                }
            }
            if !ambiguous.is_empty() {
                tracing::trace!(place, ?ambiguous, "ignoring sub-areas shared by several cities");
            }
            keys.cities.extend(area_hits);
        }

        for idx in &keys.cities {
            if let Some(city) = self.cities.get(*idx) {
                keys.regions.insert(normalize(&city.name));
                keys.regions.insert(normalize(&city.state));
            }
        }

        let named_regions = self
            .adjacency
            .iter()
            .chain(&self.zones)
            .flat_map(|group| std::iter::once(&group.name).chain(&group.members));
        for region in named_regions {
            if mentions(&tokens, region) {
                keys.regions.insert(normalize(region));
            }
        }

        keys
    }
}

impl Default for LocationTaxonomy {
    fn default() -> Self {
        Self::nigeria()
    }
}

/// Lowercase words, split on anything that is not alphanumeric
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn normalize(text: &str) -> String {
    tokenize(text).join(" ")
}

/// Whether `term` appears in `tokens` as a run of whole words
fn mentions(tokens: &[String], term: &str) -> bool {
    let needle = tokenize(term);
    !needle.is_empty() && tokens.windows(needle.len()).any(|window| window == needle.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compare(a: &str, b: &str) -> PlaceMatch {
        LocationTaxonomy::builtin().compare(a, b)
    }

    #[test]
    fn test_exact_match_ignores_case_and_punctuation() {
        assert_eq!(compare("Lekki, Lagos", "lekki lagos"), PlaceMatch::Exact);
    }

    #[test]
    fn test_same_city() {
        assert_eq!(compare("Lekki, Lagos", "Victoria Island, Lagos"), PlaceMatch::SameCity);
        // Sub-area alone resolves to its city
        assert_eq!(compare("Ikeja", "Yaba, Lagos"), PlaceMatch::SameCity);
    }

    #[test]
    fn test_adjacent_regions() {
        assert_eq!(compare("Ikeja, Lagos", "Abeokuta, Ogun"), PlaceMatch::Adjacent);
        assert_eq!(compare("Bodija, Ibadan", "Lekki, Lagos"), PlaceMatch::Adjacent);
    }

    #[test]
    fn test_same_zone() {
        assert_eq!(compare("Gwarinpa, Abuja", "Rayfield, Jos"), PlaceMatch::SameZone);
        assert_eq!(compare("GRA, Enugu", "Awka, Anambra"), PlaceMatch::SameZone);
    }

    #[test]
    fn test_unrelated_places_keep_a_floor() {
        let result = compare("Lekki, Lagos", "Fagge, Kano");
        assert_eq!(result, PlaceMatch::Unrelated);
        assert_eq!(result.score(), UNRELATED_PLACE_SCORE);
    }

    #[test]
    fn test_shared_sub_area_is_not_resolved() {
        // GRA exists in several cities
        assert_eq!(compare("GRA", "Barnawa, Kaduna"), PlaceMatch::Unrelated);
        assert_eq!(compare("GRA, Port Harcourt", "Barnawa, Kaduna"), PlaceMatch::Unrelated);
    }

    #[test]
    fn test_whole_word_matching() {
        // "ui" must not match inside "Guild"
        assert_eq!(compare("Guild Street", "Bodija, Ibadan"), PlaceMatch::Unrelated);
    }

    #[test]
    fn test_scores_are_ordered() {
        assert!(PlaceMatch::Exact.score() > PlaceMatch::SameCity.score());
        assert!(PlaceMatch::SameCity.score() > PlaceMatch::Adjacent.score());
        assert!(PlaceMatch::Adjacent.score() > PlaceMatch::SameZone.score());
        assert!(PlaceMatch::SameZone.score() > PlaceMatch::Unrelated.score());
    }

    #[test]
    fn test_suggest() {
        let taxonomy = LocationTaxonomy::builtin();
        let suggestions = taxonomy.suggest("wus", DEFAULT_SUGGESTION_LIMIT);
        assert_eq!(suggestions, vec!["Wuse, Abuja"]);

        let gra = taxonomy.suggest("gra", DEFAULT_SUGGESTION_LIMIT);
        assert!(gra.contains(&"GRA, Port Harcourt".to_string()));
        assert!(gra.contains(&"Old GRA, Port Harcourt".to_string()));

        assert_eq!(taxonomy.suggest("", 3).len(), 3);
    }

    #[test]
    fn test_custom_taxonomy_deserializes() {
        let taxonomy: LocationTaxonomy = serde_json::from_value(serde_json::json!({
            "cities": [{ "name": "Accra", "state": "greater accra", "areas": ["Osu", "Labone"] }]
        }))
        .unwrap();
        assert_eq!(taxonomy.compare("Osu", "Labone, Accra"), PlaceMatch::SameCity);
    }
}
