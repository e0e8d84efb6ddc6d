//! Email-delivery implementations.

pub mod resend;
