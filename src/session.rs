//! Keys under which device state lives in the guest's session.

pub const GUEST_PROFILE: &str = "guest_profile";
pub const ADMIN_AUTHENTICATED: &str = "admin_authenticated";
pub const ACK_UNTIL: &str = "ack_until";
pub const ALERT: &str = "alert";
