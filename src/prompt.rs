//! Prompt templating for the four-question label flow.
//!
//! Answer roles are positional: a healthy habit, a preferred style or colour,
//! an emotion, and one inspiring word that is lettered onto the image.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{GatewayError, Result};

pub const REQUIRED_ANSWERS: usize = 4;
pub const BLANK_ANSWER: &str = "no answer";

const DOODLE_NEGATIVE_PROMPT: &str = "photorealism, photo, realistic, 3D, render, CGI, \
shading, gradients, shadows, depth of field, detailed textures, glossy, blurry, watermark";

/// Exactly four answers, trimmed, with blanks replaced by a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answers([String; REQUIRED_ANSWERS]);

impl Answers {
    pub fn new(habit: &str, style: &str, emotion: &str, word: &str) -> Self {
        Self([
            normalize(habit),
            normalize(style),
            normalize(emotion),
            normalize(word),
        ])
    }

    pub fn habit(&self) -> &str {
        &self.0[0]
    }

    pub fn style(&self) -> &str {
        &self.0[1]
    }

    pub fn emotion(&self) -> &str {
        &self.0[2]
    }

    pub fn word(&self) -> &str {
        &self.0[3]
    }
}

impl TryFrom<Vec<String>> for Answers {
    type Error = GatewayError;

    /// Extra answers beyond the fourth are ignored.
    fn try_from(answers: Vec<String>) -> Result<Self> {
        match answers.as_slice() {
            [habit, style, emotion, word, ..] => Ok(Self::new(habit, style, emotion, word)),
            _ => Err(GatewayError::BadRequest(format!(
                "Se requieren {} respuestas (1 palabra cada una).",
                REQUIRED_ANSWERS
            ))),
        }
    }
}

fn normalize(answer: &str) -> String {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        BLANK_ANSWER.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptStyle {
    /// Hand-drawn monochrome line art.
    #[default]
    Doodle,
    /// Bright colourful illustration with bold typography.
    Vibrant,
}

impl PromptStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStyle::Doodle => "doodle",
            PromptStyle::Vibrant => "vibrant",
        }
    }

    pub fn negative_prompt(&self) -> Option<&'static str> {
        match self {
            PromptStyle::Doodle => Some(DOODLE_NEGATIVE_PROMPT),
            PromptStyle::Vibrant => None,
        }
    }

    fn render(&self, answers: &Answers) -> String {
        match self {
            PromptStyle::Doodle => format!(
                "A hand-drawn doodle illustration in simple black ink line art about healthy living through {habit}, \
drawn with a {style} feel. Loose, playful strokes and simple outlines on a plain white background, \
conveying a sense of {emotion}. Include the word \"{word}\" in large, bold hand-lettered typography. \
Flat, minimal, non-photorealistic, no shading, no other text.",
                habit = answers.habit(),
                style = answers.style(),
                emotion = answers.emotion(),
                word = answers.word(),
            ),
            PromptStyle::Vibrant => format!(
                "A vibrant, colorful digital illustration with a {style} modern style, focusing on healthy living through {habit}. \
Use bright and lively colors (pink, orange, turquoise, neon) and a dynamic composition. \
Convey a sense of {emotion} and include the Spanish word \"{word}\" in large, bold typography. \
No photorealism, no 3D, minimal text besides that one word. Abstract shapes, swirling lines, energetic feel.",
                habit = answers.habit(),
                style = answers.style(),
                emotion = answers.emotion(),
                word = answers.word(),
            ),
        }
    }
}

impl fmt::Display for PromptStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "doodle" => Ok(PromptStyle::Doodle),
            "vibrant" => Ok(PromptStyle::Vibrant),
            other => Err(format!(
                "unknown prompt style '{}', expected 'doodle' or 'vibrant'",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    pub prompt: String,
    pub negative_prompt: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    style: PromptStyle,
}

impl PromptBuilder {
    pub fn new(style: PromptStyle) -> Self {
        Self { style }
    }

    pub fn build(&self, answers: &Answers) -> RenderedPrompt {
        RenderedPrompt {
            prompt: self.style.render(answers),
            negative_prompt: self.style.negative_prompt().map(String::from),
        }
    }
}
