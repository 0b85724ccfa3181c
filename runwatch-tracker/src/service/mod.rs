//! Service layer
//!
//! Services read the object graph of a pipeline execution: they resolve
//! logical task names to task runs, extract typed outputs, and collect logs.
//! None of them mutate the store. Apart from log collection, which starts
//! from a run name, they never re-fetch a parent: callers control freshness
//! by passing in the snapshot they want to inspect.

mod extractor;
mod logs;
mod resolver;

pub use extractor::{ResultExtractor, get_env, get_param, get_result};
pub use logs::{ContainerLogs, LOG_FETCH_FAILED, LogAggregator};
pub use resolver::ChildResolver;
