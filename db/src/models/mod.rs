pub mod grade_record;
pub mod report_artifact;
