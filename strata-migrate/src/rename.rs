//! Rename resolution.
//!
//! Schema inspection alone cannot tell a renamed column from a dropped one
//! plus an unrelated new one. For every name that exists only in the
//! database, a [`RenameResolver`] decides whether it is dropped, renamed to
//! one of the names that exist only in the declarations, or kept as is.
//!
//! The interactive resolver asks a [`DecisionChannel`] and loops on each
//! name until the response is one of:
//!
//! - `drop <name>`: the element is dropped;
//! - one of the offered candidates (spaces may stand in for `_`): the
//!   element is renamed and the candidate is no longer created;
//! - an empty response: the element is kept and nothing is emitted for it.
//!
//! Anything else asks again. With no candidates left only a drop
//! confirmation or an empty response is accepted.

use std::collections::VecDeque;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{MigrateResult, MigrationError};

/// Kind of schema element being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// A table.
    Table,
    /// A column.
    Column,
}

impl ElementKind {
    /// Get the kind as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Column => "column",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// State of the decision for one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// Candidates exist: drop, rename or keep.
    Offer,
    /// No candidates: confirm the drop or keep.
    ConfirmDrop,
}

/// A question put to a [`DecisionChannel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamePrompt {
    /// Kind of element.
    pub kind: ElementKind,
    /// Qualifier shown before the name (e.g. `posts.`).
    pub prefix: String,
    /// The name that exists only in the database.
    pub name: SmolStr,
    /// Current state.
    pub state: PromptState,
    /// Names it could be renamed to.
    pub candidates: Vec<SmolStr>,
}

impl RenamePrompt {
    /// Headline naming the element.
    pub fn heading(&self) -> String {
        match self.state {
            PromptState::ConfirmDrop => {
                format!("CONFIRM DROP! {} {}{}", self.kind, self.prefix, self.name)
            }
            PromptState::Offer => {
                format!("DROP, RENAME or KEEP?: {} {}{}", self.kind, self.prefix, self.name)
            }
        }
    }

    /// The rename candidates line, when there are candidates.
    pub fn choices(&self) -> Option<String> {
        match self.state {
            PromptState::ConfirmDrop => None,
            PromptState::Offer => Some(format!("Rename choices: {}", self.candidates.join(", "))),
        }
    }

    /// The input request.
    pub fn question(&self) -> String {
        match self.state {
            PromptState::ConfirmDrop => {
                format!("Enter 'drop {}' to confirm or press enter to keep:", self.name)
            }
            PromptState::Offer => format!(
                "Enter either 'drop {}' or one of the rename choices or press enter to keep:",
                self.name
            ),
        }
    }
}

/// Where rename decisions come from.
pub trait DecisionChannel {
    /// Ask for a response. `None` means the channel is closed.
    fn ask(&mut self, prompt: &RenamePrompt) -> Option<String>;
}

impl<C: DecisionChannel + ?Sized> DecisionChannel for &mut C {
    fn ask(&mut self, prompt: &RenamePrompt) -> Option<String> {
        (**self).ask(prompt)
    }
}

/// A channel answering from a fixed list of responses.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChannel {
    responses: VecDeque<String>,
    asked: Vec<RenamePrompt>,
}

impl ScriptedChannel {
    /// Create a channel that answers with `responses` in order.
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
        }
    }

    /// Prompts asked so far.
    pub fn asked(&self) -> &[RenamePrompt] {
        &self.asked
    }

    /// Responses not consumed yet.
    pub fn remaining(&self) -> usize {
        self.responses.len()
    }
}

impl DecisionChannel for ScriptedChannel {
    fn ask(&mut self, prompt: &RenamePrompt) -> Option<String> {
        self.asked.push(prompt.clone());
        self.responses.pop_front()
    }
}

/// Outcome of interpreting one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Drop the element.
    Drop,
    /// Rename the element to the given candidate.
    Rename(SmolStr),
    /// Keep the element; emit nothing.
    Keep,
    /// Ask again.
    Reprompt,
}

/// Interpret a response for `name` given the current candidates.
pub fn decide(name: &str, candidates: &[SmolStr], response: &str) -> Decision {
    let response = response.trim();
    if response == format!("drop {name}") {
        return Decision::Drop;
    }
    if response.is_empty() {
        return Decision::Keep;
    }
    if candidates.is_empty() {
        return Decision::Reprompt;
    }

    let normalized = response.replace(' ', "_");
    match candidates.iter().find(|c| **c == normalized) {
        Some(choice) => Decision::Rename(choice.clone()),
        None => Decision::Reprompt,
    }
}

/// Decides which one-sided names are renames.
pub trait RenameResolver {
    /// Resolve `to_drop` against `to_create`.
    ///
    /// Returns the renames as `old -> new`. Renamed names leave both lists;
    /// kept names leave `to_drop`. What remains is created and dropped.
    fn extract_renames(
        &mut self,
        to_create: &mut Vec<SmolStr>,
        to_drop: &mut Vec<SmolStr>,
        kind: ElementKind,
        prefix: &str,
    ) -> MigrateResult<IndexMap<SmolStr, SmolStr>>;
}

impl<R: RenameResolver + ?Sized> RenameResolver for &mut R {
    fn extract_renames(
        &mut self,
        to_create: &mut Vec<SmolStr>,
        to_drop: &mut Vec<SmolStr>,
        kind: ElementKind,
        prefix: &str,
    ) -> MigrateResult<IndexMap<SmolStr, SmolStr>> {
        (**self).extract_renames(to_create, to_drop, kind, prefix)
    }
}

/// Drops everything without asking; never renames.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForceDrop;

impl RenameResolver for ForceDrop {
    fn extract_renames(
        &mut self,
        _to_create: &mut Vec<SmolStr>,
        _to_drop: &mut Vec<SmolStr>,
        _kind: ElementKind,
        _prefix: &str,
    ) -> MigrateResult<IndexMap<SmolStr, SmolStr>> {
        Ok(IndexMap::new())
    }
}

/// Keeps everything without asking; never renames or drops.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl RenameResolver for KeepAll {
    fn extract_renames(
        &mut self,
        _to_create: &mut Vec<SmolStr>,
        to_drop: &mut Vec<SmolStr>,
        kind: ElementKind,
        prefix: &str,
    ) -> MigrateResult<IndexMap<SmolStr, SmolStr>> {
        for name in to_drop.drain(..) {
            debug!(%kind, element = %format!("{prefix}{name}"), "keeping");
        }
        Ok(IndexMap::new())
    }
}

/// Asks a [`DecisionChannel`] about every name.
#[derive(Debug)]
pub struct InteractiveResolver<C> {
    channel: C,
}

impl<C: DecisionChannel> InteractiveResolver<C> {
    /// Create a resolver over a channel.
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Get the channel back.
    pub fn into_inner(self) -> C {
        self.channel
    }

    /// Get the channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }
}

impl<C: DecisionChannel> RenameResolver for InteractiveResolver<C> {
    fn extract_renames(
        &mut self,
        to_create: &mut Vec<SmolStr>,
        to_drop: &mut Vec<SmolStr>,
        kind: ElementKind,
        prefix: &str,
    ) -> MigrateResult<IndexMap<SmolStr, SmolStr>> {
        let mut renames = IndexMap::new();

        for name in to_drop.clone() {
            loop {
                let prompt = RenamePrompt {
                    kind,
                    prefix: prefix.to_string(),
                    name: name.clone(),
                    state: if to_create.is_empty() {
                        PromptState::ConfirmDrop
                    } else {
                        PromptState::Offer
                    },
                    candidates: to_create.clone(),
                };

                let response = self
                    .channel
                    .ask(&prompt)
                    .ok_or_else(|| MigrationError::channel_closed(format!("{prefix}{name}")))?;

                match decide(&name, to_create, &response) {
                    Decision::Drop => {
                        debug!(%kind, element = %format!("{prefix}{name}"), "confirmed drop");
                        break;
                    }
                    Decision::Rename(new_name) => {
                        debug!(%kind, from = %format!("{prefix}{name}"), to = %new_name, "rename");
                        to_drop.retain(|n| *n != name);
                        to_create.retain(|n| *n != new_name);
                        renames.insert(name.clone(), new_name);
                        break;
                    }
                    Decision::Keep => {
                        debug!(%kind, element = %format!("{prefix}{name}"), "keeping");
                        to_drop.retain(|n| *n != name);
                        break;
                    }
                    Decision::Reprompt => {
                        warn!(response = response.trim(), "unrecognised response, asking again");
                    }
                }
            }
        }

        Ok(renames)
    }
}
