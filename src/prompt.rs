// ABOUTME: Persona builder — the seeded instruction/greeting pair and on-screen texts.
// ABOUTME: Compiles defaults from src/prompts/*.md, supports config and file-based overrides.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, PersonaConfig};
use crate::session::Message;

/// Compiled-in default persona texts.
const DEFAULT_INSTRUCTION: &str = include_str!("prompts/instruction.md");
const DEFAULT_GREETING: &str = include_str!("prompts/greeting.md");

const DEFAULT_TITLE: &str = "👨‍⚕️ Chatbot Apoteker";
const DEFAULT_SUBTITLE: &str = "Tanyakan tentang obat untuk penyakit Anda. Saya akan memberikan jawaban singkat dan jelas. Pertanyaan di luar topik akan saya tolak.";
const DEFAULT_PLACEHOLDER: &str = "Tuliskan penyakit atau gejala Anda...";
const DEFAULT_ERROR_PREFIX: &str = "Maaf, terjadi kesalahan saat berkomunikasi dengan";

/// Reads a file if it exists, returning None otherwise.
pub fn read_if_exists(path: PathBuf) -> Option<String> {
    if path.exists() {
        fs::read_to_string(&path).ok()
    } else {
        None
    }
}

/// Everything the chat screen and the seeded transcript need to know about
/// who the assistant is.
#[derive(Debug, Clone)]
pub struct Persona {
    pub title: String,
    pub subtitle: String,
    pub instruction: String,
    pub greeting: String,
    pub input_placeholder: String,
    pub error_prefix: String,
    pub system_instruction: Option<String>,
}

impl Persona {
    /// Creates a persona loaded with the compiled-in pharmacist defaults.
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
            instruction: DEFAULT_INSTRUCTION.trim().to_string(),
            greeting: DEFAULT_GREETING.trim().to_string(),
            input_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            error_prefix: DEFAULT_ERROR_PREFIX.to_string(),
            system_instruction: None,
        }
    }

    /// Defaults, then ~/.apoteker/*.md files, then explicit config values.
    pub fn from_config(config: &PersonaConfig) -> Self {
        let mut persona = Self::new();
        persona.load_overrides(&Config::config_dir());
        persona.apply_config(config);
        persona
    }

    /// Checks `dir` for `instruction.md` / `greeting.md` and replaces texts if found.
    pub fn load_overrides(&mut self, dir: &Path) -> &mut Self {
        if let Some(content) = read_if_exists(dir.join("instruction.md")) {
            self.instruction = content.trim().to_string();
        }
        if let Some(content) = read_if_exists(dir.join("greeting.md")) {
            self.greeting = content.trim().to_string();
        }
        self
    }

    pub fn apply_config(&mut self, config: &PersonaConfig) -> &mut Self {
        let fields = [
            (&config.title, &mut self.title),
            (&config.subtitle, &mut self.subtitle),
            (&config.instruction, &mut self.instruction),
            (&config.greeting, &mut self.greeting),
            (&config.input_placeholder, &mut self.input_placeholder),
            (&config.error_prefix, &mut self.error_prefix),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        if config.system_instruction.is_some() {
            self.system_instruction = config.system_instruction.clone();
        }
        self
    }

    /// The opening transcript: the instruction as a user turn, then the greeting
    /// as the assistant's answer. Blank texts are left out.
    pub fn seed(&self) -> Vec<Message> {
        [
            Message::user(self.instruction.as_str()),
            Message::assistant(self.greeting.as_str()),
        ]
        .into_iter()
        .filter_map(Result::ok)
        .collect()
    }

    /// Inline text shown when a turn fails.
    pub fn error_text(&self, service: &str, error: &str) -> String {
        format!("{} {}: {}", self.error_prefix, service, error)
    }
}

impl Default for Persona {
    fn default() -> Self {
        Self::new()
    }
}
