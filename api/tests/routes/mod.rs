mod grader;
mod health_test;
mod tasks_test;
