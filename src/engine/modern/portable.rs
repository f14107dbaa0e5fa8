//! Portable class library profiles

use crate::engine::DottedVersion;

pub struct PortableProfile {
    pub number: u32,
    pub version: DottedVersion,
    /// Member frameworks as folder names
    pub frameworks: &'static [&'static str],
}

const V4_0: DottedVersion = DottedVersion::of(4, 0);
const V4_5: DottedVersion = DottedVersion::of(4, 5);
const V4_6: DottedVersion = DottedVersion::of(4, 6);

pub const PROFILES: &[PortableProfile] = &[
    PortableProfile { number: 2, version: V4_0, frameworks: &["net40", "sl4", "win8", "wp7"] },
    PortableProfile { number: 3, version: V4_0, frameworks: &["net40", "sl4"] },
    PortableProfile { number: 4, version: V4_0, frameworks: &["net45", "sl4", "win8", "wp7"] },
    PortableProfile { number: 5, version: V4_0, frameworks: &["net40", "win8"] },
    PortableProfile { number: 6, version: V4_0, frameworks: &["net403", "win8"] },
    PortableProfile { number: 7, version: V4_5, frameworks: &["net45", "win8"] },
    PortableProfile { number: 14, version: V4_0, frameworks: &["net40", "sl5"] },
    PortableProfile { number: 19, version: V4_0, frameworks: &["net403", "sl5"] },
    PortableProfile { number: 24, version: V4_0, frameworks: &["net45", "sl5"] },
    PortableProfile { number: 31, version: V4_6, frameworks: &["win81", "wp81"] },
    PortableProfile { number: 32, version: V4_6, frameworks: &["win81", "wpa81"] },
    PortableProfile { number: 36, version: V4_0, frameworks: &["net40", "sl4", "win8", "wp8"] },
    PortableProfile { number: 37, version: V4_0, frameworks: &["net40", "sl5", "win8"] },
    PortableProfile { number: 41, version: V4_0, frameworks: &["net403", "sl4", "win8"] },
    PortableProfile { number: 42, version: V4_0, frameworks: &["net403", "sl5", "win8"] },
    PortableProfile { number: 44, version: V4_6, frameworks: &["net451", "win81"] },
    PortableProfile { number: 46, version: V4_0, frameworks: &["net45", "sl4", "win8"] },
    PortableProfile { number: 47, version: V4_0, frameworks: &["net40", "sl5", "win8"] },
    PortableProfile { number: 49, version: V4_5, frameworks: &["net45", "wp8"] },
    PortableProfile { number: 78, version: V4_5, frameworks: &["net45", "win8", "wp8"] },
    PortableProfile { number: 84, version: V4_6, frameworks: &["wp81", "wpa81"] },
    PortableProfile { number: 88, version: V4_0, frameworks: &["net40", "sl4", "win8", "wp75"] },
    PortableProfile { number: 92, version: V4_0, frameworks: &["net40", "win8", "wpa81"] },
    PortableProfile { number: 96, version: V4_0, frameworks: &["net403", "sl4", "win8", "wp75"] },
    PortableProfile { number: 102, version: V4_0, frameworks: &["net403", "win8", "wpa81"] },
    PortableProfile { number: 104, version: V4_0, frameworks: &["net45", "sl4", "win8", "wp75"] },
    PortableProfile { number: 111, version: V4_5, frameworks: &["net45", "win8", "wpa81"] },
    PortableProfile { number: 136, version: V4_0, frameworks: &["net40", "sl5", "win8", "wp8"] },
    PortableProfile { number: 143, version: V4_0, frameworks: &["net403", "sl4", "win8", "wp8"] },
    PortableProfile { number: 147, version: V4_0, frameworks: &["net403", "sl5", "win8", "wp8"] },
    PortableProfile { number: 151, version: V4_6, frameworks: &["net451", "win81", "wpa81"] },
    PortableProfile { number: 154, version: V4_0, frameworks: &["net45", "sl4", "win8", "wp8"] },
    PortableProfile { number: 157, version: V4_6, frameworks: &["win81", "wp81", "wpa81"] },
    PortableProfile { number: 158, version: V4_0, frameworks: &["net45", "sl5", "win8", "wp8"] },
    PortableProfile { number: 225, version: V4_0, frameworks: &["net40", "sl5", "win8", "wpa81"] },
    PortableProfile { number: 240, version: V4_0, frameworks: &["net403", "sl5", "win8", "wpa81"] },
    PortableProfile { number: 255, version: V4_0, frameworks: &["net45", "sl5", "win8", "wpa81"] },
    PortableProfile { number: 259, version: V4_5, frameworks: &["net45", "win8", "wp8", "wpa81"] },
    PortableProfile { number: 328, version: V4_0, frameworks: &["net40", "sl5", "win8", "wp8", "wpa81"] },
    PortableProfile { number: 336, version: V4_0, frameworks: &["net403", "sl5", "win8", "wp8", "wpa81"] },
    PortableProfile { number: 344, version: V4_0, frameworks: &["net45", "sl5", "win8", "wp8", "wpa81"] },
];

/// Profile number from a `ProfileN` string (case-insensitive)
pub fn profile_number(profile: &str) -> Option<u32> {
    let lower = profile.to_ascii_lowercase();
    let digits = lower.strip_prefix("profile")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn find_by_number(number: u32) -> Option<&'static PortableProfile> {
    PROFILES.iter().find(|p| p.number == number)
}

/// Find the profile whose member set equals `folders` (order-insensitive)
pub fn find_by_frameworks(folders: &[String]) -> Option<&'static PortableProfile> {
    let mut wanted: Vec<String> = folders.iter().map(|f| f.to_ascii_lowercase()).collect();
    wanted.sort();
    wanted.dedup();

    PROFILES.iter().find(|profile| {
        let mut members: Vec<String> = profile.frameworks.iter().map(|f| f.to_string()).collect();
        members.sort();
        members == wanted
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Profile7", Some(7))]
    #[case("profile259", Some(259))]
    #[case("Profile", None)]
    #[case("Client", None)]
    #[case("Profile7a", None)]
    fn profile_number_parses_profile_names(#[case] input: &str, #[case] expected: Option<u32>) {
        assert_eq!(profile_number(input), expected);
    }

    #[test]
    fn find_by_frameworks_ignores_order() {
        let folders = vec!["win8".to_string(), "net45".to_string()];
        assert_eq!(find_by_frameworks(&folders).map(|p| p.number), Some(7));
    }

    #[test]
    fn find_by_frameworks_returns_none_for_unknown_combination() {
        let folders = vec!["net45".to_string(), "monoandroid".to_string()];
        assert!(find_by_frameworks(&folders).is_none());
    }

    #[test]
    fn profile_numbers_are_unique() {
        let mut numbers: Vec<u32> = PROFILES.iter().map(|p| p.number).collect();
        numbers.sort();
        numbers.dedup();
        assert_eq!(numbers.len(), PROFILES.len());
    }
}
