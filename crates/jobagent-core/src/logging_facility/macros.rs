//! Canonical logging macros
//!
//! Every operation boundary emits the same field set so log pipelines and
//! tests can match on `op` / `event` without parsing messages. Extra
//! `key = value` fields may follow the required ones.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use jobagent_core::log_op_start;
/// log_op_start!("apply_migrations");
/// log_op_start!("apply_migration", migration_id = "001_create_users");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = jobagent_core_types::schema::EVENT_START,
            $($($field)*)?
        )
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use jobagent_core::log_op_end;
/// log_op_end!("apply_migrations", duration_ms = 3);
/// log_op_end!("apply_migrations", duration_ms = 3, applied_count = 5);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = jobagent_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log an operation that ended in an error
///
/// Accepts anything convertible into `ExError`; the event carries its kind
/// and stable code under `err.kind` / `err.code`.
///
/// # Example
///
/// ```
/// # use jobagent_core::log_op_error;
/// # use jobagent_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::MigrationFailed);
/// log_op_error!("apply_migration", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = jobagent_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($($field)*)?
        );
    }};
}
