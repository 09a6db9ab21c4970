pub mod config;
pub mod description;
pub mod interview;
pub mod job;
pub mod listing;

pub use config::Config;
pub use interview::{Effect, InterviewSession, Phase};
pub use job::{ChatMessage, Job, JobContext, JobPage, MessageKind, QuestionAnswer, SearchParams};
pub use listing::{Filter, ListingState, SearchRequest};
