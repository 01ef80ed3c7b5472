pub mod aggregation_service;
pub mod lifecycle_service;
pub mod mail_service;
pub mod openai_service;
pub mod pdf_service;
pub mod prompts;
pub mod report_service;
pub mod survey_service;

pub use mail_service::{LogMailer, Mailer, SendGridMailer};
pub use openai_service::{OpenAiClient, TextGenerator};
pub use pdf_service::{GotenbergRenderer, PdfRenderer};
