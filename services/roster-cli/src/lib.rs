mod cli;
mod commands;
mod render;

use roster_core::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
