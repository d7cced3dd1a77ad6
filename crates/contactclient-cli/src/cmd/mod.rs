pub mod init;
pub mod send_contact;
