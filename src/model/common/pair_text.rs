//! Parsing of pasted text into option pairs for bulk import.

use serde::{Deserialize, Serialize};

/// The two option texts of a pair, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionPair {
    pub option_a: String,
    pub option_b: String,
}

impl OptionPair {
    pub fn new(option_a: impl Into<String>, option_b: impl Into<String>) -> Self {
        Self {
            option_a: option_a.into(),
            option_b: option_b.into(),
        }
    }
}

/// How pasted text is laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairTextFormat {
    /// One option per line; blank lines are ignored and every two
    /// remaining lines form a pair. A trailing odd line is dropped.
    #[default]
    Lines,
    /// Pairs separated by blank lines; the first two lines of each block
    /// form a pair. Blocks with fewer than two lines are dropped.
    Blocks,
}

/// Split `text` into option pairs according to `format`.
///
/// Every option is trimmed of surrounding whitespace.
pub fn parse_pairs(text: &str, format: PairTextFormat) -> Vec<OptionPair> {
    match format {
        PairTextFormat::Lines => parse_lines(text),
        PairTextFormat::Blocks => parse_blocks(text),
    }
}

fn parse_lines(text: &str) -> Vec<OptionPair> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>();
    lines
        .chunks_exact(2)
        .map(|chunk| OptionPair::new(chunk[0], chunk[1]))
        .collect()
}

fn parse_blocks(text: &str) -> Vec<OptionPair> {
    let mut pairs = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim).chain(std::iter::once("")) {
        if !line.is_empty() {
            block.push(line);
            continue;
        }
        if let [option_a, option_b, ..] = block[..] {
            pairs.push(OptionPair::new(option_a, option_b));
        }
        block.clear();
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> OptionPair {
        OptionPair::new(a, b)
    }

    #[test]
    fn lines_chunk_in_twos() {
        let text = "hot tamales\ndark chocolate\n\n  cookies  \nchocolate\r\npringles";
        assert_eq!(
            parse_pairs(text, PairTextFormat::Lines),
            vec![
                pair("hot tamales", "dark chocolate"),
                pair("cookies", "chocolate"),
            ]
        );
    }

    #[test]
    fn lines_yield_half_the_non_empty_lines() {
        for n in 0..9 {
            let text = (0..n)
                .map(|i| format!("option {i}\n\n"))
                .collect::<String>();
            assert_eq!(parse_pairs(&text, PairTextFormat::Lines).len(), n / 2);
        }
    }

    #[test]
    fn blocks_split_on_blank_lines() {
        let text = "Option A\nOption B\n\n\nOption C\nOption D\nignored\n\nlonely\n   \nE\nF";
        assert_eq!(
            parse_pairs(text, PairTextFormat::Blocks),
            vec![
                pair("Option A", "Option B"),
                pair("Option C", "Option D"),
                pair("E", "F"),
            ]
        );
    }

    #[test]
    fn formats_disagree_on_misaligned_text() {
        // A stray single-line block shifts every later pair in `lines` mode only.
        let text = "a\nb\n\nstray\n\nc\nd";
        assert_eq!(
            parse_pairs(text, PairTextFormat::Lines),
            vec![pair("a", "b"), pair("stray", "c")]
        );
        assert_eq!(
            parse_pairs(text, PairTextFormat::Blocks),
            vec![pair("a", "b"), pair("c", "d")]
        );
    }

    #[test]
    fn empty_text() {
        assert!(parse_pairs("", PairTextFormat::Lines).is_empty());
        assert!(parse_pairs("\n \n", PairTextFormat::Blocks).is_empty());
    }

    #[test]
    fn format_names() {
        let format: PairTextFormat = rocket::serde::json::from_str("\"blocks\"").unwrap();
        assert_eq!(format, PairTextFormat::Blocks);
        assert_eq!(PairTextFormat::default(), PairTextFormat::Lines);
    }
}
