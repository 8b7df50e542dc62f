//! Praat TextGrid reader
//!
//! Both text layouts Praat writes (long, with `key = value` lines, and short,
//! values only) carry the same sequence of strings, numbers and flags. The
//! reader tokenizes the file, drops keys and `[n]` indices, and walks that
//! sequence, so either layout parses with the same code.

use crate::error::{FormantSweepError, Result};
use crate::types::Interval;
use std::path::Path;
use tracing::debug;

/// A parsed TextGrid
#[derive(Debug, Clone, PartialEq)]
pub struct TextGrid {
    pub xmin: f64,
    pub xmax: f64,
    pub tiers: Vec<Tier>,
}

/// One annotation tier
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub name: String,
    pub content: TierContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TierContent {
    Intervals(Vec<Interval>),
    /// Point tier marks as (time, text)
    Points(Vec<(f64, String)>),
}

impl TextGrid {
    /// Intervals of the 1-based `tier`, in file order
    pub fn interval_tier(&self, tier: usize, path: &Path) -> Result<&[Interval]> {
        let selected = tier
            .checked_sub(1)
            .and_then(|i| self.tiers.get(i))
            .ok_or_else(|| FormantSweepError::TierNotFound {
                path: path.to_path_buf(),
                tier,
                available: self.tiers.len(),
            })?;

        match &selected.content {
            TierContent::Intervals(intervals) => Ok(intervals),
            TierContent::Points(_) => Err(FormantSweepError::annotation_error(
                path,
                format!("tier {} ('{}') is a point tier, not an interval tier", tier, selected.name),
            )),
        }
    }
}

/// Read and parse a TextGrid file (UTF-8 or UTF-16 with BOM)
pub fn read_textgrid(path: &Path) -> Result<TextGrid> {
    let bytes = std::fs::read(path)
        .map_err(|e| FormantSweepError::annotation_error(path, format!("Failed to read file: {}", e)))?;
    let text = decode_text(&bytes).map_err(|reason| FormantSweepError::annotation_error(path, reason))?;
    let grid = parse(&text).map_err(|reason| FormantSweepError::annotation_error(path, reason))?;

    debug!("Read {} tiers from {}", grid.tiers.len(), path.display());
    Ok(grid)
}

fn decode_text(bytes: &[u8]) -> std::result::Result<String, String> {
    let utf16 = |body: &[u8], from: fn([u8; 2]) -> u16| {
        let units: Vec<u16> = body.chunks_exact(2).map(|c| from([c[0], c[1]])).collect();
        String::from_utf16(&units).map_err(|e| format!("invalid UTF-16: {}", e))
    };

    match bytes {
        [0xFF, 0xFE, body @ ..] => utf16(body, u16::from_le_bytes),
        [0xFE, 0xFF, body @ ..] => utf16(body, u16::from_be_bytes),
        [0xEF, 0xBB, 0xBF, body @ ..] => {
            String::from_utf8(body.to_vec()).map_err(|e| format!("invalid UTF-8: {}", e))
        }
        _ => String::from_utf8(bytes.to_vec()).map_err(|e| format!("invalid UTF-8: {}", e)),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Number(f64),
    Flag(bool),
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            value.push('"');
                        }
                        Some('"') => break,
                        Some(ch) => value.push(ch),
                        None => return Err("unterminated string".to_string()),
                    }
                }
                tokens.push(Token::Text(value));
            }
            '[' => {
                // Item indices: "item [1]:", "intervals [3]:"
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                }
            }
            '!' => {
                // Comment to end of line
                for ch in chars.by_ref() {
                    if ch == '\n' {
                        break;
                    }
                }
            }
            _ => {
                let mut word = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_whitespace() || ch == '"' || ch == '[' {
                        break;
                    }
                    word.push(ch);
                    chars.next();
                }
                match word.as_str() {
                    "<exists>" => tokens.push(Token::Flag(true)),
                    "<absent>" => tokens.push(Token::Flag(false)),
                    _ => {
                        if let Ok(n) = word.parse::<f64>() {
                            if n.is_finite() {
                                tokens.push(Token::Number(n));
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(tokens)
}

struct Cursor {
    tokens: std::vec::IntoIter<Token>,
}

impl Cursor {
    fn text(&mut self, what: &str) -> std::result::Result<String, String> {
        match self.tokens.next() {
            Some(Token::Text(s)) => Ok(s),
            other => Err(unexpected(what, other)),
        }
    }

    fn number(&mut self, what: &str) -> std::result::Result<f64, String> {
        match self.tokens.next() {
            Some(Token::Number(n)) => Ok(n),
            other => Err(unexpected(what, other)),
        }
    }

    /// A count of items that follow; each item takes at least one token, so
    /// a count beyond the tokens left is a broken file
    fn count(&mut self, what: &str) -> std::result::Result<usize, String> {
        let n = self.number(what)?;
        if n < 0.0 || n.fract() != 0.0 {
            return Err(format!("{} must be a whole number, found {}", what, n));
        }
        let remaining = self.tokens.len();
        if n > remaining as f64 {
            return Err(format!(
                "{} of {} exceeds the {} values left in the file",
                what, n, remaining
            ));
        }
        Ok(n as usize)
    }
}

fn unexpected(what: &str, found: Option<Token>) -> String {
    match found {
        Some(token) => format!("expected {}, found {:?}", what, token),
        None => format!("unexpected end of file, expected {}", what),
    }
}

/// Parse TextGrid text in either layout
pub fn parse(text: &str) -> std::result::Result<TextGrid, String> {
    let mut cursor = Cursor {
        tokens: tokenize(text)?.into_iter(),
    };

    let file_type = cursor.text("file type")?;
    if file_type != "ooTextFile" {
        return Err(format!("not a Praat text file (file type '{}')", file_type));
    }
    let class = cursor.text("object class")?;
    if class != "TextGrid" {
        return Err(format!("object class is '{}', expected 'TextGrid'", class));
    }

    let xmin = cursor.number("xmin")?;
    let xmax = cursor.number("xmax")?;
    let has_tiers = match cursor.tokens.next() {
        Some(Token::Flag(flag)) => flag,
        other => return Err(unexpected("tiers flag", other)),
    };
    if !has_tiers {
        return Ok(TextGrid {
            xmin,
            xmax,
            tiers: Vec::new(),
        });
    }

    let tier_count = cursor.count("tier count")?;
    let mut tiers = Vec::with_capacity(tier_count);
    for _ in 0..tier_count {
        let class = cursor.text("tier class")?;
        let name = cursor.text("tier name")?;
        cursor.number("tier xmin")?;
        cursor.number("tier xmax")?;
        let size = cursor.count("item count")?;

        let content = match class.as_str() {
            "IntervalTier" => {
                let mut intervals = Vec::with_capacity(size);
                for _ in 0..size {
                    let start = cursor.number("interval xmin")?;
                    let end = cursor.number("interval xmax")?;
                    let label = cursor.text("interval text")?;
                    intervals.push(Interval { label, start, end });
                }
                TierContent::Intervals(intervals)
            }
            "TextTier" => {
                let mut points = Vec::with_capacity(size);
                for _ in 0..size {
                    let time = cursor.number("point time")?;
                    let mark = cursor.text("point mark")?;
                    points.push((time, mark));
                }
                TierContent::Points(points)
            }
            other => return Err(format!("unknown tier class '{}'", other)),
        };
        tiers.push(Tier { name, content });
    }

    Ok(TextGrid { xmin, xmax, tiers })
}
