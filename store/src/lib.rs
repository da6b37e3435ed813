pub mod models;

mod directory;
mod error;
mod memory;
mod notes;
mod postgres;

pub use directory::UserDirectory;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use models::{GoogleAccount, NewNote, NewUser, Note, NotePage, NotePatch, User, UserProfile};
pub use notes::NoteStore;
pub use postgres::PgStore;

/// Combined storage surface handed to the HTTP layer.
pub trait Store: UserDirectory + NoteStore {}

impl<T: UserDirectory + NoteStore> Store for T {}
