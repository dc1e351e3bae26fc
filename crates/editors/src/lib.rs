//! Admin record editors.
//!
//! Each editor loads its collection, validates input before any store call,
//! performs exactly one mutation, and on success reports the change to the
//! audit log. Audit failures never affect the mutation result.

pub mod achievements;
pub mod admin_emails;
pub mod editor;
pub mod error;
pub mod investment_rates;
pub mod record;
pub mod settings;
pub mod store;
pub mod validate;

pub use achievements::{AchievementEditor, AchievementForm};
pub use admin_emails::AdminEmailEditor;
pub use editor::{Editor, Mutation};
pub use error::{EditorError, StoreError, ValidationError};
pub use investment_rates::InvestmentRateEditor;
pub use record::EditorRecord;
pub use settings::{SettingForm, SystemSettingsEditor, ValidationRuleForm};
pub use store::{MemoryRecordStore, RecordStore};
