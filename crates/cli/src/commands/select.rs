//! `select` - resolve ambiguous endpoints and save the mapping.

use std::io::{BufRead, Write};

use thiserror::Error;
use toolkit_engine::ConfigError;
use toolkit_engine::selection::{
    AmbiguityResolver, AutoResolver, ResolutionRequest, SelectionError, select_endpoints,
};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// Prompts on a terminal until it gets a valid index.
pub struct TerminalResolver<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalResolver<R, W> {
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, request: &ResolutionRequest) -> std::io::Result<Option<usize>> {
        let last = request.candidates.len().saturating_sub(1);

        writeln!(
            self.output,
            "Multiple endpoints found for {}.{}:",
            request.entity_name, request.action
        )?;
        writeln!(self.output)?;
        for (idx, cap) in request.candidates.iter().enumerate() {
            match cap.score {
                Some(score) => writeln!(
                    self.output,
                    "  [{idx}] {:6} {} (score: {score:.2})",
                    cap.http_method, cap.path
                )?,
                None => writeln!(self.output, "  [{idx}] {:6} {}", cap.http_method, cap.path)?,
            }
        }
        writeln!(self.output)?;

        loop {
            write!(
                self.output,
                "Select endpoint for {}.{} [0-{last}]: ",
                request.entity_name, request.action
            )?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(None);
            }

            match line.trim().parse::<usize>() {
                Ok(idx) if idx <= last => {
                    writeln!(self.output, "Selected option {idx}")?;
                    writeln!(self.output)?;
                    return Ok(Some(idx));
                }
                Ok(_) => writeln!(self.output, "Please enter a number between 0 and {last}")?,
                Err(_) => writeln!(self.output, "Please enter a valid number")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> AmbiguityResolver for TerminalResolver<R, W> {
    fn resolve(&mut self, request: &ResolutionRequest) -> Result<usize, SelectionError> {
        match self.ask(request) {
            Ok(Some(idx)) => Ok(idx),
            Ok(None) => Err(SelectionError::Cancelled("input closed".to_string())),
            Err(err) => Err(SelectionError::Cancelled(err.to_string())),
        }
    }
}

/// Load capabilities, resolve ambiguities and write `<id>_mapping.json`.
#[allow(clippy::print_stdout)]
pub async fn run(product_id: &str, auto: bool) -> Result<(), SelectError> {
    let (_config, store) = super::context()?;

    println!("Loading capabilities for '{product_id}'...");
    let capabilities = store.load_capabilities(product_id).await?;
    println!("Loaded {} capabilities", capabilities.len());
    println!();

    let outcome = if auto {
        select_endpoints(&capabilities, &mut AutoResolver)?
    } else {
        let stdin = std::io::stdin();
        let mut resolver = TerminalResolver::new(stdin.lock(), std::io::stdout());
        select_endpoints(&capabilities, &mut resolver)?
    };

    if outcome.ambiguities == 0 {
        println!("No ambiguities detected. All entity/action pairs have single endpoints.");
    } else {
        println!("Resolved {} ambiguous entity/action pairs.", outcome.ambiguities);
    }
    println!();

    let path = store.save_mapping(product_id, &outcome.mapping).await?;
    println!("Mapping saved to: {}", path.display());
    println!();

    println!("Final mapping summary:");
    println!();
    for (entity, actions) in outcome.mapping.iter() {
        println!("  {entity}:");
        for (action, endpoint) in actions {
            println!("    {action:10} {:6} {}", endpoint.http_method, endpoint.path);
        }
        println!();
    }
    Ok(())
}
