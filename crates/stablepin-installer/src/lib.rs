mod fs_utils;
mod host;
mod layout;
mod pins;
mod receipts;
mod types;

pub use host::PrefixHost;
pub use layout::{default_user_prefix, PrefixLayout};
pub use pins::{append_pins, read_pins};
pub use receipts::{
    read_install_receipt, read_install_receipts, read_installed_registry, remove_install_receipt,
    write_install_receipt,
};
pub use types::InstallReceipt;

#[cfg(test)]
mod tests;
