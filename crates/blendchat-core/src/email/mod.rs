//! Email-delivery port and invitation composition.

pub mod mailer;
