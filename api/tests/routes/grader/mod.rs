mod marks_test;
#[cfg(unix)]
mod run_test;
