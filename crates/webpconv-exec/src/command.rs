//! Encoder invocations.
//!
//! An [`EncoderCommand`] is a program plus a discrete argument vector. It is
//! executed without a shell, so paths can never split into extra tokens; the
//! escaped [`EncoderCommand::render`] form exists for logs and diagnostics.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use webpconv_common::{paths::is_png, ConversionOptions, Metadata};

/// Characters that carry meaning to a POSIX shell and get a backslash.
const SHELL_META: &[char] = &[
    '\\', '$', ';', '&', '|', '<', '>', '(', ')', '*', '?', '[', ']', '{', '}', '!', '#', '~',
];

/// A fully formed encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderCommand {
    program: PathBuf,
    args: Vec<OsString>,
}

impl EncoderCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<OsString>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<OsString>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// The program to execute.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The argument vector, without the program.
    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether `arg` appears in the argument vector.
    pub fn has_arg(&self, arg: impl AsRef<OsStr>) -> bool {
        self.args.iter().any(|a| a == arg.as_ref())
    }

    /// The same invocation wrapped in a reduced-priority scheduler.
    pub fn niced(&self, wrapper: impl Into<PathBuf>) -> Self {
        let mut args = Vec::with_capacity(self.args.len() + 1);
        args.push(self.program.clone().into_os_string());
        args.extend(self.args.iter().cloned());
        Self {
            program: wrapper.into(),
            args,
        }
    }

    /// Shell-style rendering with every token escaped.
    pub fn render(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|token| escape_arg(&token.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build a [`std::process::Command`] for this invocation.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

impl fmt::Display for EncoderCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Escape one token for display in a shell-like command line.
///
/// Quotes and control characters are dropped; whitespace and shell
/// metacharacters are backslash-escaped.
pub fn escape_arg(arg: &str) -> String {
    let mut escaped = String::with_capacity(arg.len());
    for c in arg.chars() {
        if matches!(c, '"' | '\'' | '`') || c.is_control() {
            continue;
        }
        if c.is_whitespace() || SHELL_META.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build a cwebp invocation.
///
/// `-lossless` is added for PNG sources only; quality and method are passed
/// through without range checks.
pub fn build_cwebp(
    binary: &Path,
    source: &Path,
    destination: &Path,
    options: &ConversionOptions,
) -> EncoderCommand {
    let mut cmd = EncoderCommand::new(binary);
    cmd.arg("-metadata")
        .arg(options.metadata.as_str())
        .arg("-q")
        .arg(options.quality.to_string());

    if is_png(source) {
        cmd.arg("-lossless");
    }

    cmd.arg("-m").arg(options.method.to_string());

    if options.low_memory {
        cmd.arg("-low_memory");
    }

    cmd.arg(source).arg("-o").arg(destination);
    cmd
}

/// Build an ImageMagick invocation (`magick` or legacy `convert`).
pub fn build_imagemagick(
    binary: &Path,
    source: &Path,
    destination: &Path,
    options: &ConversionOptions,
) -> EncoderCommand {
    let mut cmd = EncoderCommand::new(binary);
    cmd.arg(source)
        .arg("-quality")
        .arg(options.quality.to_string())
        .arg("-define")
        .arg(format!("webp:method={}", options.method));

    if is_png(source) {
        cmd.args(["-define", "webp:lossless=true"]);
    }
    if options.low_memory {
        cmd.args(["-define", "webp:low-memory=true"]);
    }
    if options.metadata == Metadata::None {
        cmd.arg("-strip");
    }

    let mut target = OsString::from("webp:");
    target.push(destination);
    cmd.arg(target);
    cmd
}
