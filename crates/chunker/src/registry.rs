use crate::chunker::{Chunker, Result};
use crate::{DEFAULT_CHUNK_OVERLAP, DEFAULT_MAX_CHUNK_TOKENS};
use std::path::Path;
use std::sync::{Arc, Mutex};

type Factory = Box<dyn Fn() -> Result<Arc<dyn Chunker>> + Send + Sync>;

/// Registration record for one pluggable chunker.
///
/// The actual [`Chunker`] is built lazily from the factory on first use and
/// cached by id for the registry's lifetime.
pub struct ChunkerDescriptor {
    pub id: String,
    pub display_name: String,
    pub language: String,
    /// Higher priority wins within a language group.
    pub priority: i32,
    pub max_chunk_tokens: u32,
    pub chunk_overlap: u32,
    factory: Factory,
}

impl ChunkerDescriptor {
    pub fn new<F>(
        id: impl Into<String>,
        display_name: impl Into<String>,
        language: impl Into<String>,
        priority: i32,
        factory: F,
    ) -> Self
    where
        F: Fn() -> Result<Arc<dyn Chunker>> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            language: language.into(),
            priority,
            max_chunk_tokens: DEFAULT_MAX_CHUNK_TOKENS,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            factory: Box::new(factory),
        }
    }

    #[must_use]
    pub fn with_token_limits(mut self, max_chunk_tokens: u32, chunk_overlap: u32) -> Self {
        self.max_chunk_tokens = max_chunk_tokens;
        self.chunk_overlap = chunk_overlap;
        self
    }
}

impl std::fmt::Debug for ChunkerDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkerDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("language", &self.language)
            .field("priority", &self.priority)
            .field("max_chunk_tokens", &self.max_chunk_tokens)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish_non_exhaustive()
    }
}

enum SlotState {
    Uninit,
    Ready(Arc<dyn Chunker>),
    /// Factory failed once; the descriptor is skipped for the rest of the
    /// process lifetime, no retry.
    Disabled,
}

struct Slot {
    descriptor: ChunkerDescriptor,
    state: SlotState,
}

impl Slot {
    /// Instantiate on first use; disable permanently on factory failure.
    fn instance(&mut self) -> Option<Arc<dyn Chunker>> {
        match &self.state {
            SlotState::Ready(chunker) => Some(chunker.clone()),
            SlotState::Disabled => None,
            SlotState::Uninit => match (self.descriptor.factory)() {
                Ok(chunker) => {
                    self.state = SlotState::Ready(chunker.clone());
                    Some(chunker)
                }
                Err(e) => {
                    log::warn!(
                        "Chunker '{}' failed to instantiate, disabling: {e}",
                        self.descriptor.id
                    );
                    self.state = SlotState::Disabled;
                    None
                }
            },
        }
    }
}

/// Maps a source file to the best-matching registered chunker.
///
/// Explicitly constructed and dependency-injected; hosts call
/// [`ChunkerRegistry::register`] once at startup for each chunker they ship.
pub struct ChunkerRegistry {
    // Sorted by (language, priority desc) so resolution is a linear scan over
    // language groups with priority tie-break.
    slots: Mutex<Vec<Slot>>,
}

impl ChunkerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
        }
    }

    /// Register a chunker descriptor.
    ///
    /// Re-registering an id before its chunker was instantiated replaces the
    /// descriptor; after instantiation the call is ignored, preserving the
    /// singleton guarantee.
    pub fn register(&self, descriptor: ChunkerDescriptor) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(slot) = slots.iter_mut().find(|s| s.descriptor.id == descriptor.id) {
            if matches!(slot.state, SlotState::Uninit) {
                slot.descriptor = descriptor;
            } else {
                log::warn!(
                    "Chunker '{}' already instantiated, ignoring re-registration",
                    descriptor.id
                );
                return;
            }
        } else {
            slots.push(Slot {
                descriptor,
                state: SlotState::Uninit,
            });
        }

        slots.sort_by(|a, b| {
            a.descriptor
                .language
                .cmp(&b.descriptor.language)
                .then(b.descriptor.priority.cmp(&a.descriptor.priority))
        });
    }

    /// Resolve the chunker that claims `path`.
    ///
    /// Linear scan over language groups; within a group, chunkers are tried
    /// in descending priority and the first whose `can_handle` accepts the
    /// file wins.
    #[must_use]
    pub fn chunker_for(&self, path: &Path) -> Option<Arc<dyn Chunker>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        for slot in slots.iter_mut() {
            let Some(chunker) = slot.instance() else {
                continue;
            };
            if chunker.can_handle(path) {
                return Some(chunker);
            }
        }
        None
    }

    /// Highest-priority chunker registered for exactly `language`, ignoring
    /// `can_handle`.
    #[must_use]
    pub fn chunker_for_language(&self, language: &str) -> Option<Arc<dyn Chunker>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .iter_mut()
            .filter(|s| s.descriptor.language == language)
            .find_map(Slot::instance)
    }

    /// Whether `path` is claimed by any registered chunker.
    #[must_use]
    pub fn accepts(&self, path: &Path) -> bool {
        self.chunker_for(path).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ChunkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
