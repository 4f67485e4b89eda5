pub(super) mod alchemy;
pub(super) mod report;
pub(super) mod settings;
