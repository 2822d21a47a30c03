pub mod pipeline;

pub use pipeline::{
    run_json_import, run_json_import_tracked, run_remote_import, run_remote_import_tracked,
    TriggerSource,
};
