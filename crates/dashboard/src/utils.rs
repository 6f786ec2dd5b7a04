use checkpointz_types::{primitives::Epoch, status::Status, upstream::Upstream};

/// Shortens a root for display: first 8 chars, `...`, last 6 chars.
/// Inputs shorter than 14 chars are not guarded and overlap.
pub fn truncate_hash(hash: Option<&str>) -> String {
    let Some(hash) = hash.filter(|hash| !hash.is_empty()) else {
        return String::new();
    };
    let chars: Vec<char> = hash.chars().collect();
    let head: String = chars.iter().take(8).collect();
    let tail: String = chars[chars.len().saturating_sub(6)..].iter().collect();
    format!("{head}...{tail}")
}

/// Decodes a `0x`-prefixed hex string two digits at a time into characters.
/// Each pair contributes the value of its longest valid hex prefix; a pair
/// with no hex digit at all becomes NUL.
pub fn hex_to_ascii(hex: Option<&str>) -> String {
    let Some(hex) = hex else {
        return String::new();
    };
    let chars: Vec<char> = hex.chars().collect();
    chars
        .get(2..)
        .unwrap_or_default()
        .chunks(2)
        .map(|pair| {
            let digits: String = pair.iter().take_while(|c| c.is_ascii_hexdigit()).collect();
            u8::from_str_radix(&digits, 16).map_or('\0', char::from)
        })
        .collect()
}

/// Deterministic `#rrggbb` colour for a string, so equal roots get equal
/// colours across rows.
pub fn string_to_hex_colour(value: &str) -> String {
    let hash = value.encode_utf16().fold(0i32, |hash, unit| {
        i32::from(unit).wrapping_add((hash << 5).wrapping_sub(hash))
    });

    let mut colour = String::from("#");
    for i in 0..3 {
        let byte = (hash >> (i * 8)) & 0xff;
        colour.push_str(&format!("{byte:x}"));
    }
    // single-digit bytes are not zero padded, so pad the tail instead
    while colour.len() < 7 {
        colour.push('0');
    }
    colour.truncate(7);
    colour
}

/// Parses `#rrggbb` into its components.
pub fn parse_hex_colour(colour: &str) -> Option<(u8, u8, u8)> {
    let hex = colour.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// The network name reported by the most upstreams. Ties go to the name seen
/// first.
pub fn majority_network_name<'a>(
    upstreams: impl IntoIterator<Item = &'a Upstream>,
) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in upstreams
        .into_iter()
        .filter_map(|upstream| upstream.network_name.as_deref())
        .filter(|name| !name.is_empty())
    {
        match counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }

    counts
        .into_iter()
        .fold(None, |best: Option<(&str, usize)>, (name, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((name, count)),
        })
        .map(|(name, _)| name.to_string())
}

pub fn latest_finalized_epoch(status: &Status) -> Option<Epoch> {
    status
        .finality
        .as_ref()?
        .finalized
        .as_ref()
        .map(|checkpoint| checkpoint.epoch)
}

#[cfg(test)]
mod tests {
    use checkpointz_types::checkpoint::{Checkpoint, Finality};

    use super::*;

    fn upstream(name: &str, network_name: Option<&str>) -> Upstream {
        Upstream {
            name: name.to_string(),
            healthy: true,
            network_name: network_name.map(str::to_string),
            finality: None,
        }
    }

    #[rstest::rstest]
    #[case(None, "")]
    #[case(Some(""), "")]
    #[case(Some("0x1234567890abcdef1234"), "0x123456...ef1234")]
    #[case(
        Some("0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92"),
        "0x91e4f5...1c0d92"
    )]
    #[case(Some("abc"), "abc...abc")]
    #[case(Some("0x12345678"), "0x123456...345678")]
    fn test_truncate_hash(#[case] hash: Option<&str>, #[case] expected: &str) {
        assert_eq!(truncate_hash(hash), expected);
    }

    #[rstest::rstest]
    #[case(Some("0x48656c6c6f"), "Hello")]
    #[case(None, "")]
    #[case(Some("0x"), "")]
    #[case(Some(""), "")]
    #[case(Some("0"), "")]
    #[case(Some("0x4865000000"), "He\0\0\0")]
    #[case(Some("0x486"), "H\u{6}")]
    #[case(Some("0x4g"), "\u{4}")]
    #[case(Some("0xzz41"), "\0A")]
    fn test_hex_to_ascii(#[case] hex: Option<&str>, #[case] expected: &str) {
        assert_eq!(hex_to_ascii(hex), expected);
    }

    #[rstest::rstest]
    #[case("", "#000000")]
    #[case("a", "#610000")]
    fn test_string_to_hex_colour_known(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(string_to_hex_colour(input), expected);
    }

    #[rstest::rstest]
    #[case("0x91e4f5129bc54f7284f1690e00803db360aeb63d34610d6995e1145bd01c0d92")]
    #[case("0x854ca984298e6a0d9fc098b4e37f1b28727e545a8e4d3106188fda3587d14cdb")]
    #[case("mainnet")]
    #[case("ünïcödé ✓")]
    fn test_string_to_hex_colour_shape(#[case] input: &str) {
        let colour = string_to_hex_colour(input);

        assert_eq!(colour, string_to_hex_colour(input));
        assert_eq!(colour.len(), 7);
        assert!(colour.starts_with('#'));
        assert!(colour[1..].chars().all(|c| c.is_ascii_hexdigit()));
        assert!(parse_hex_colour(&colour).is_some());
    }

    #[rstest::rstest]
    #[case("#610000", Some((0x61, 0, 0)))]
    #[case("#ffA0b1", Some((0xff, 0xa0, 0xb1)))]
    #[case("610000", None)]
    #[case("#6100", None)]
    #[case("#gg0000", None)]
    fn test_parse_hex_colour(#[case] input: &str, #[case] expected: Option<(u8, u8, u8)>) {
        assert_eq!(parse_hex_colour(input), expected);
    }

    #[test]
    fn test_majority_network_name_empty() {
        assert_eq!(majority_network_name(&[]), None);
        assert_eq!(
            majority_network_name(&[upstream("a", None), upstream("b", Some(""))]),
            None
        );
    }

    #[test]
    fn test_majority_network_name() {
        let upstreams = [
            upstream("a", Some("mainnet")),
            upstream("b", Some("mainnet")),
            upstream("c", Some("goerli")),
        ];

        assert_eq!(majority_network_name(&upstreams).as_deref(), Some("mainnet"));
    }

    #[test]
    fn test_majority_network_name_tie_goes_to_first_seen() {
        let upstreams = [
            upstream("a", Some("sepolia")),
            upstream("b", Some("holesky")),
            upstream("c", Some("holesky")),
            upstream("d", Some("sepolia")),
            upstream("e", None),
        ];

        assert_eq!(majority_network_name(&upstreams).as_deref(), Some("sepolia"));
    }

    #[test]
    fn test_latest_finalized_epoch() {
        let mut status = Status::default();
        assert_eq!(latest_finalized_epoch(&status), None);

        status.finality = Some(Finality {
            finalized: Some(Checkpoint {
                epoch: 16532,
                root: "0x91e4".to_string(),
            }),
            ..Default::default()
        });
        assert_eq!(latest_finalized_epoch(&status), Some(16532));
    }
}
