//! Static gazetteer of Azerbaijani cities and Baku districts used to derive a
//! partner's `location` from free-form city/address text.
//!
//! Matching is case-insensitive and folds the dotless `ı` and the combining
//! dot of `İ` so that `"BAKI"`, `"Bakı"` and `"baki"` all match.

/// Location used when neither the city nor the address matches anything.
pub const UNKNOWN_LOCATION: &str = "Unknown";

const BAKU: &str = "Bakı";
const BAKU_ALIASES: &[&str] = &["bakı", "baku"];

/// `(canonical district, aliases)`. A district match yields `"Bakı - <district>"`.
const BAKU_DISTRICTS: &[(&str, &[&str])] = &[
    ("Yasamal", &["yasamal"]),
    ("Nərimanov", &["nərimanov", "narimanov"]),
    ("Xətai", &["xətai", "khatai", "xatai"]),
    ("Nəsimi", &["nəsimi", "nasimi"]),
    ("Səbail", &["səbail", "sabail"]),
    ("Binəqədi", &["binəqədi", "binagadi"]),
    ("Nizami", &["nizami r", "nizami rayon"]),
    ("Suraxanı", &["suraxanı", "surakhani"]),
    ("Sabunçu", &["sabunçu", "sabunchu"]),
    ("Xəzər", &["xəzər", "khazar"]),
    ("Qaradağ", &["qaradağ", "garadagh"]),
    ("Pirallahı", &["pirallahı"]),
    ("Günəşli", &["günəşli", "gunashli"]),
    ("Ağ Şəhər", &["ağ şəhər", "white city"]),
];

/// `(canonical city, aliases)`, checked after Baku.
const CITIES: &[(&str, &[&str])] = &[
    ("Gəncə", &["gəncə", "ganja"]),
    ("Sumqayıt", &["sumqayıt", "sumgait", "sumgayit"]),
    ("Mingəçevir", &["mingəçevir", "mingachevir"]),
    ("Xırdalan", &["xırdalan", "khirdalan"]),
    ("Naxçıvan", &["naxçıvan", "nakhchivan"]),
    ("Lənkəran", &["lənkəran", "lankaran"]),
    ("Şəki", &["şəki", "sheki"]),
    ("Zaqatala", &["zaqatala", "zagatala"]),
    ("Şirvan", &["şirvan", "shirvan"]),
    ("Qəbələ", &["qəbələ", "gabala"]),
    ("Quba", &["quba r", "quba ş", "quba,", "guba"]),
    ("Şamaxı", &["şamaxı", "shamakhi"]),
    ("Masallı", &["masallı", "masalli"]),
    ("Bərdə", &["bərdə", "barda"]),
    ("Yevlax", &["yevlax", "yevlakh"]),
    ("Ağdaş", &["ağdaş", "agdash"]),
    ("Qazax", &["qazax", "gazakh"]),
    ("Salyan", &["salyan"]),
];

/// Cities reported individually by the region rollup; everything else is
/// `"Other Regions"`.
const MAJOR_CITIES: &[&str] = &[BAKU, "Gəncə", "Sumqayıt", "Mingəçevir"];

/// Derives a location from an optional city field and an optional address.
///
/// The city text is tried first, then the address. Within one text a Baku
/// mention wins (refined to a district when one is named), then any other
/// known city, then a bare Baku district name. Returns [`UNKNOWN_LOCATION`]
/// when nothing matches.
#[must_use]
pub fn locate(city: Option<&str>, address: Option<&str>) -> String {
    [city, address]
        .into_iter()
        .flatten()
        .find_map(locate_in)
        .unwrap_or_else(|| UNKNOWN_LOCATION.to_owned())
}

fn locate_in(text: &str) -> Option<String> {
    let folded = fold(text);
    if folded.trim().is_empty() {
        return None;
    }

    let district = BAKU_DISTRICTS
        .iter()
        .find(|(_, aliases)| contains_any(&folded, aliases))
        .map(|(name, _)| *name);

    if contains_any(&folded, BAKU_ALIASES) {
        return Some(district.map_or_else(|| BAKU.to_owned(), |d| format!("{BAKU} - {d}")));
    }

    if let Some((name, _)) = CITIES
        .iter()
        .find(|(_, aliases)| contains_any(&folded, aliases))
    {
        return Some((*name).to_owned());
    }

    district.map(|d| format!("{BAKU} - {d}"))
}

/// Collapses a location to the major-city rollup.
#[must_use]
pub fn region_of(location: &str) -> &'static str {
    if location == UNKNOWN_LOCATION {
        return UNKNOWN_LOCATION;
    }
    MAJOR_CITIES
        .iter()
        .find(|city| location.starts_with(*city))
        .copied()
        .unwrap_or("Other Regions")
}

fn contains_any(folded: &str, aliases: &[&str]) -> bool {
    aliases.iter().any(|alias| folded.contains(&fold(alias)))
}

fn fold(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| *c != '\u{307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baku_with_district() {
        assert_eq!(
            locate(None, Some("Bakı şəh., Yasamal r-nu, Şərifzadə küç. 12")),
            "Bakı - Yasamal"
        );
    }

    #[test]
    fn baku_without_district() {
        assert_eq!(locate(None, Some("Baku, 28 May street")), "Bakı");
    }

    #[test]
    fn matching_ignores_case_and_dotless_i() {
        assert_eq!(locate(None, Some("BAKI, NƏSİMİ R.")), "Bakı - Nəsimi");
        assert_eq!(locate(None, Some("sumqayit ş., 5-ci mkr")), "Sumqayıt");
    }

    #[test]
    fn other_city() {
        assert_eq!(locate(None, Some("Gəncə ş., Atatürk pr. 1")), "Gəncə");
    }

    #[test]
    fn bare_district_implies_baku() {
        assert_eq!(locate(None, Some("Xətai r., Babək pr. 5")), "Bakı - Xətai");
    }

    #[test]
    fn city_field_takes_precedence_over_address() {
        assert_eq!(locate(Some("Şəki"), Some("Bakı, Yasamal")), "Şəki");
    }

    #[test]
    fn unmatched_city_falls_back_to_address() {
        assert_eq!(locate(Some("Online"), Some("Lənkəran ş.")), "Lənkəran");
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(locate(None, None), UNKNOWN_LOCATION);
        assert_eq!(locate(Some(""), Some("Main street 1")), UNKNOWN_LOCATION);
    }

    #[test]
    fn region_rollup() {
        assert_eq!(region_of("Bakı - Yasamal"), "Bakı");
        assert_eq!(region_of("Bakı"), "Bakı");
        assert_eq!(region_of("Gəncə"), "Gəncə");
        assert_eq!(region_of("Şəki"), "Other Regions");
        assert_eq!(region_of(UNKNOWN_LOCATION), UNKNOWN_LOCATION);
    }
}
