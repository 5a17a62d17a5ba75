//! Clients for the third-party APIs the domain layer talks to.

pub mod shufti_pro;
