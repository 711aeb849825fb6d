/// Line templates: literal prose with live score interpolation.

use thiserror::Error;

use crate::schema::score::ScoreState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("empty braces")]
    EmptyBraces,
    #[error("nested braces are not allowed")]
    NestedBraces,
    #[error("unclosed brace")]
    Unclosed,
    #[error("unmatched closing brace")]
    UnmatchedClose,
    #[error("unknown score field '{0}'")]
    UnknownField(String),
}

/// A score value a line can interpolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreField {
    Gold,
    FavorSettlers,
    FavorOthers,
    Testified,
    Shielded,
}

impl ScoreField {
    fn parse(name: &str) -> Option<ScoreField> {
        match name {
            "gold" => Some(Self::Gold),
            "favor_settlers" => Some(Self::FavorSettlers),
            "favor_others" => Some(Self::FavorOthers),
            "testified" => Some(Self::Testified),
            "shielded" => Some(Self::Shielded),
            _ => None,
        }
    }

    fn write(&self, score: &ScoreState, out: &mut String) {
        let yes_no = |b: bool| if b { "yes" } else { "no" };
        match self {
            Self::Gold => out.push_str(&score.gold.to_string()),
            Self::FavorSettlers => out.push_str(&score.favor_settlers.to_string()),
            Self::FavorOthers => out.push_str(&score.favor_others.to_string()),
            Self::Testified => out.push_str(yes_no(score.testified)),
            Self::Shielded => out.push_str(yes_no(score.shielded)),
        }
    }
}

/// A segment of a parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Score(ScoreField),
}

/// A parsed display line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTemplate {
    pub segments: Vec<Segment>,
}

impl LineTemplate {
    /// Parse a line into segments.
    ///
    /// Syntax:
    /// - `{gold}`, `{favor_settlers}`, `{favor_others}`, `{testified}`,
    ///   `{shielded}` → score interpolation
    /// - `{{` / `}}` → literal braces
    /// - Everything else → literal text
    pub fn parse(input: &str) -> Result<LineTemplate, TemplateError> {
        let mut segments = Vec::new();
        let mut literal_buf = String::new();
        let chars: Vec<char> = input.chars().collect();
        let len = chars.len();
        let mut i = 0;

        while i < len {
            match chars[i] {
                '{' if i + 1 < len && chars[i + 1] == '{' => {
                    literal_buf.push('{');
                    i += 2;
                }
                '{' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < len && chars[end] != '}' {
                        if chars[end] == '{' {
                            return Err(TemplateError::NestedBraces);
                        }
                        end += 1;
                    }
                    if end == len {
                        return Err(TemplateError::Unclosed);
                    }
                    let name: String = chars[start..end].iter().collect();
                    if name.is_empty() {
                        return Err(TemplateError::EmptyBraces);
                    }
                    let field = ScoreField::parse(name.trim())
                        .ok_or_else(|| TemplateError::UnknownField(name.clone()))?;

                    if !literal_buf.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal_buf)));
                    }
                    segments.push(Segment::Score(field));
                    i = end + 1;
                }
                '}' if i + 1 < len && chars[i + 1] == '}' => {
                    literal_buf.push('}');
                    i += 2;
                }
                '}' => return Err(TemplateError::UnmatchedClose),
                c => {
                    literal_buf.push(c);
                    i += 1;
                }
            }
        }

        if !literal_buf.is_empty() {
            segments.push(Segment::Literal(literal_buf));
        }

        Ok(LineTemplate { segments })
    }

    /// Wrap text that needs no parsing.
    pub fn literal(text: impl Into<String>) -> LineTemplate {
        LineTemplate {
            segments: vec![Segment::Literal(text.into())],
        }
    }

    pub fn is_literal(&self) -> bool {
        self.segments.iter().all(|s| matches!(s, Segment::Literal(_)))
    }

    /// Produce the display string for a score snapshot.
    pub fn render(&self, score: &ScoreState) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Score(field) => field.write(score, &mut out),
            }
        }
        out
    }
}
