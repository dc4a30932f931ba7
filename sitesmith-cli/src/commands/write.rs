//! File writer command

use std::io::Read;

use clap::Args;
use sitesmith_core::tools::{WriteArgs as WriteCall, DEFAULT_EXTENSION};
use sitesmith_core::{ToolCall, Toolbox};

use super::print_record;

/// Write generated content into the output directory
#[derive(Args, Debug)]
pub struct WriteArgs {
    /// Content to write (read from stdin when omitted)
    pub content: Option<String>,

    /// File name without extension (defaults to a timestamp)
    #[arg(short, long)]
    pub filename: Option<String>,

    /// File extension
    #[arg(short, long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,
}

impl WriteArgs {
    /// Execute the write command, returning whether it succeeded
    pub fn execute(self, toolbox: &mut Toolbox) -> anyhow::Result<bool> {
        let content = match self.content {
            Some(content) => content,
            None => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };

        let record = toolbox.dispatch(ToolCall::WriteToFile(WriteCall {
            content,
            filename: self.filename,
            extension: self.extension,
        }));
        print_record(&record)
    }
}
