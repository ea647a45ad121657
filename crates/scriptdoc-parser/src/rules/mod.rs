//! The nine directive rules.

mod control;
mod decision;
mod dialogue;
mod image;
mod narration;
mod predicate;
mod scene;
mod sound;
mod subtitle;

pub use control::ControlRule;
pub use decision::{DECISION_STATE, DecisionRule, DecisionState};
pub use dialogue::DialogueRule;
pub use image::{IMAGE_STATE, ImageRule, ImageState};
pub use narration::NarrationRule;
pub use predicate::{PredicateRule, branch_label};
pub use scene::SceneRule;
pub use sound::{SoundRule, is_visible_cue};
pub use subtitle::SubtitleRule;
