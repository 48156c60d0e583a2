pub mod batch_persister;
pub mod disaster_import;
pub mod import_report;
pub mod progress;
pub mod row_mapper;

#[cfg(test)]
pub(crate) mod test_support;
