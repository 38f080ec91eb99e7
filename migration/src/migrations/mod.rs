pub mod m20250901_000001_create_report_artifacts;
pub mod m20250901_000002_create_grade_records;
