//! Codec registry and conversion-rule tables.
//!
//! Holds the static table of known encodings: which extensions map to
//! which codec, whether a codec is usable as a source or a destination,
//! and, for destination-capable codecs, the external commands that
//! produce them from a given source encoding.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::Path;
use thiserror::Error;

/// Error type for codec registration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A codec with this name is already registered
    #[error("duplicate codec name: {0}")]
    DuplicateCodec(String),

    /// An extension is claimed by more than one codec
    #[error("extension .{extension} is already registered to {codec}")]
    DuplicateExtension { extension: String, codec: String },
}

/// No conversion rule (exact or wildcard) exists for a codec pair.
///
/// Expected per-file condition, not a programming error: the caller
/// records it as one failed file and keeps going.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoTranscoder {
    pub source: String,
    pub destination: String,
}

// Manual impls: thiserror would treat the `source` field as the error
// source, but here it is the source *encoding name*, not a cause.
impl std::fmt::Display for NoTranscoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "no transcoder available for {} -> {}",
            self.source, self.destination
        )
    }
}

impl std::error::Error for NoTranscoder {}

/// One token of a conversion command template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandToken {
    /// Verbatim argv token
    Literal(String),
    /// Substituted with the resolved source file path
    SourcePath,
    /// Substituted with the resolved destination file path
    DestinationPath,
}

/// Shorthand for a literal token.
fn lit(token: &str) -> CommandToken {
    CommandToken::Literal(token.to_string())
}

/// Ordered command template; the first token is the program to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRule {
    tokens: Vec<CommandToken>,
}

impl ConversionRule {
    pub fn new(tokens: Vec<CommandToken>) -> Self {
        Self { tokens }
    }

    /// Substitute placeholders and return the literal argv list.
    ///
    /// Pure and deterministic: the same inputs always yield the same command.
    pub fn resolve(&self, source: &Path, destination: &Path) -> Vec<OsString> {
        self.tokens
            .iter()
            .map(|token| match token {
                CommandToken::Literal(s) => OsString::from(s),
                CommandToken::SourcePath => source.as_os_str().to_owned(),
                CommandToken::DestinationPath => destination.as_os_str().to_owned(),
            })
            .collect()
    }
}

/// An ffmpeg decode-anything rule: `ffmpeg -y -loglevel error -i <src> <codec args> <dst>`.
fn ffmpeg_rule(codec_args: &[&str]) -> ConversionRule {
    let mut tokens = vec![
        lit("ffmpeg"),
        lit("-y"),
        lit("-loglevel"),
        lit("error"),
        lit("-i"),
        CommandToken::SourcePath,
    ];
    tokens.extend(codec_args.iter().map(|arg| lit(arg)));
    tokens.push(CommandToken::DestinationPath);
    ConversionRule::new(tokens)
}

/// A known encoding: identity, extensions, capability flags, and the
/// rule table used to transcode into it.
#[derive(Debug, Clone)]
pub struct Codec {
    /// Codec identity, unique across the registry
    pub name: String,
    /// Canonical file extension (lowercase, without dot)
    pub extension: String,
    /// Alternate extensions that also map to this codec
    pub aliases: Vec<String>,
    /// Usable as a source encoding
    pub source: bool,
    /// Usable as a destination encoding
    pub destination: bool,
    /// Encoding discards information
    pub lossy: bool,
    /// Conversion rules keyed by source codec name
    pub rules: HashMap<String, ConversionRule>,
    /// Fallback rule for any source codec without a dedicated entry
    pub wildcard: Option<ConversionRule>,
}

impl Codec {
    /// All extensions that map to this codec, canonical first.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.extension.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Case-insensitive extension match.
    pub fn matches_extension(&self, ext: &str) -> bool {
        self.extensions().any(|e| e.eq_ignore_ascii_case(ext))
    }

    /// Build the argv list that transcodes `source` material into this codec.
    ///
    /// Looks up the source codec's dedicated rule, falling back to the
    /// wildcard entry. Pure lookup and substitution with no side effects,
    /// so it can run during the read-only scan phase.
    pub fn conversion_command(
        &self,
        source: &Codec,
        source_path: &Path,
        destination_path: &Path,
    ) -> Result<Vec<OsString>, NoTranscoder> {
        let rule = self
            .rules
            .get(&source.name)
            .or(self.wildcard.as_ref())
            .ok_or_else(|| NoTranscoder {
                source: source.name.clone(),
                destination: self.name.clone(),
            })?;
        Ok(rule.resolve(source_path, destination_path))
    }
}

/// Registry of all known codecs.
///
/// Read-only after initialization; lookups require no locking.
#[derive(Debug, Clone, Default)]
pub struct CodecRegistry {
    codecs: Vec<Codec>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec, rejecting name or extension collisions.
    pub fn register(&mut self, codec: Codec) -> Result<(), RegistryError> {
        if self.by_name(&codec.name).is_some() {
            return Err(RegistryError::DuplicateCodec(codec.name));
        }
        for ext in codec.extensions() {
            if let Some(existing) = self.by_extension(ext) {
                return Err(RegistryError::DuplicateExtension {
                    extension: ext.to_string(),
                    codec: existing.name.clone(),
                });
            }
        }
        self.codecs.push(codec);
        Ok(())
    }

    /// Look up a codec by name (case-insensitive).
    pub fn by_name(&self, name: &str) -> Option<&Codec> {
        self.codecs.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Look up the codec owning an extension (case-insensitive).
    pub fn by_extension(&self, ext: &str) -> Option<&Codec> {
        self.codecs.iter().find(|c| c.matches_extension(ext))
    }

    /// Codecs usable as a source encoding.
    pub fn source_codecs(&self) -> Vec<&Codec> {
        self.codecs.iter().filter(|c| c.source).collect()
    }

    /// Codecs usable as a destination encoding.
    pub fn destination_codecs(&self) -> Vec<&Codec> {
        self.codecs.iter().filter(|c| c.destination).collect()
    }

    /// All registered codecs.
    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }

    /// The shipped codec table.
    ///
    /// Destination codecs carry a dedicated `flac ->` rule where a native
    /// encoder exists (opusenc, oggenc) and an ffmpeg wildcard fallback
    /// for every other source.
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        let table = vec![
            Codec {
                name: "flac".to_string(),
                extension: "flac".to_string(),
                aliases: vec![],
                source: true,
                destination: true,
                lossy: false,
                rules: HashMap::new(),
                wildcard: Some(ffmpeg_rule(&["-c:a", "flac"])),
            },
            Codec {
                name: "mp3".to_string(),
                extension: "mp3".to_string(),
                aliases: vec![],
                source: true,
                destination: true,
                lossy: true,
                rules: HashMap::new(),
                wildcard: Some(ffmpeg_rule(&["-c:a", "libmp3lame", "-q:a", "2"])),
            },
            Codec {
                name: "vorbis".to_string(),
                extension: "ogg".to_string(),
                aliases: vec!["oga".to_string()],
                source: true,
                destination: true,
                lossy: true,
                rules: HashMap::from([(
                    "flac".to_string(),
                    ConversionRule::new(vec![
                        lit("oggenc"),
                        lit("--quiet"),
                        lit("-q"),
                        lit("5"),
                        lit("-o"),
                        CommandToken::DestinationPath,
                        CommandToken::SourcePath,
                    ]),
                )]),
                wildcard: Some(ffmpeg_rule(&["-c:a", "libvorbis", "-q:a", "5"])),
            },
            Codec {
                name: "opus".to_string(),
                extension: "opus".to_string(),
                aliases: vec![],
                source: true,
                destination: true,
                lossy: true,
                rules: HashMap::from([(
                    "flac".to_string(),
                    ConversionRule::new(vec![
                        lit("opusenc"),
                        lit("--quiet"),
                        lit("--bitrate"),
                        lit("128"),
                        CommandToken::SourcePath,
                        CommandToken::DestinationPath,
                    ]),
                )]),
                wildcard: Some(ffmpeg_rule(&["-c:a", "libopus", "-b:a", "128k"])),
            },
            Codec {
                name: "aac".to_string(),
                extension: "m4a".to_string(),
                aliases: vec!["aac".to_string()],
                source: true,
                destination: false,
                lossy: true,
                rules: HashMap::new(),
                wildcard: None,
            },
            Codec {
                name: "wav".to_string(),
                extension: "wav".to_string(),
                aliases: vec![],
                source: true,
                destination: false,
                lossy: false,
                rules: HashMap::new(),
                wildcard: None,
            },
            Codec {
                name: "wma".to_string(),
                extension: "wma".to_string(),
                aliases: vec![],
                source: true,
                destination: false,
                lossy: true,
                rules: HashMap::new(),
                wildcard: None,
            },
        ];

        for codec in table {
            registry
                .register(codec)
                .expect("builtin codec table is collision-free");
        }
        registry
    }
}
