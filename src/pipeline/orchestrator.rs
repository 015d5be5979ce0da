// 全ジョブ実行

use crate::pipeline::JobError;
use crate::pipeline::job_runner::{JobConfig, JobResult, run_job};

/// Run multiple jobs, collecting results.
/// One job failure does NOT prevent other jobs from running.
pub fn run_all_jobs(jobs: &[JobConfig]) -> Vec<Result<JobResult, JobError>> {
    jobs.iter().map(run_job).collect()
}
