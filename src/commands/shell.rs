//! `pantry shell` command: a line-oriented REPL over the controller.

use std::io::Write as _;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::chat::{ChatReply, Mode};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::controller::Controller;

const HELP: &str = "\
Commands:
  scan                 scan a barcode from the camera
  test                 add the sample barcode
  list                 show scanned ingredients
  remove <barcode>     forget a scanned ingredient
  clear                forget all scanned ingredients
  mode [light|dark]    show or switch mode (dark = recipe mode)
  ask <prompt>         ask the assistant
  shop                 shopping list for the last answer
  add <product-id>     add a listed product to the cart
  qty <id> <delta>     change a cart quantity
  rm <id>              remove a cart line
  cart                 show the cart
  clear-cart yes       empty the cart
  reset                start over
  quit                 leave the shell";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Blank line.
    Empty,
    /// Camera scan.
    Scan,
    /// Sample-barcode scan.
    Test,
    /// Show the ingredient list.
    List,
    /// Remove an ingredient by barcode.
    Remove(String),
    /// Clear all ingredients.
    Clear,
    /// Show (`None`) or set the mode.
    Mode(Option<Mode>),
    /// Chat prompt.
    Ask(String),
    /// Shopping list from the last reply.
    Shop,
    /// Add a listed product by id.
    Add(String),
    /// Change a cart quantity.
    Qty {
        /// Product id.
        id: String,
        /// Signed change.
        delta: i32,
    },
    /// Remove a cart line.
    Rm(String),
    /// Show the cart.
    Cart,
    /// Clear the cart.
    ClearCart {
        /// Whether the user confirmed.
        confirmed: bool,
    },
    /// Reset everything.
    Reset,
    /// Print help.
    Help,
    /// Leave the shell.
    Quit,
}

impl ShellCommand {
    /// Parses one input line.
    ///
    /// # Errors
    ///
    /// Returns a usage message for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let arg = |usage: &str| {
            if rest.is_empty() {
                Err(format!("usage: {usage}"))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "" => Self::Empty,
            "scan" => Self::Scan,
            "test" => Self::Test,
            "list" => Self::List,
            "remove" => Self::Remove(arg("remove <barcode>")?),
            "clear" => Self::Clear,
            "mode" => Self::Mode(match rest {
                "" => None,
                "light" => Some(Mode::Light),
                "dark" => Some(Mode::Dark),
                other => return Err(format!("unknown mode '{other}' (light or dark)")),
            }),
            "ask" => Self::Ask(arg("ask <prompt>")?),
            "shop" => Self::Shop,
            "add" => Self::Add(arg("add <product-id>")?),
            "qty" => {
                let usage = || "usage: qty <id> <delta>".to_string();
                let (id, delta) = rest.split_once(char::is_whitespace).ok_or_else(usage)?;
                let delta = delta.trim().parse().map_err(|_| usage())?;
                Self::Qty { id: id.to_string(), delta }
            }
            "rm" => Self::Rm(arg("rm <id>")?),
            "cart" => Self::Cart,
            "clear-cart" => Self::ClearCart { confirmed: rest == "yes" },
            "reset" => Self::Reset,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(command)
    }
}

/// Shell state between lines.
pub struct Shell {
    controller: Controller,
    timeout: Duration,
    last_reply: Option<ChatReply>,
}

impl Shell {
    /// Wraps a controller; camera scans give up after `timeout`.
    #[must_use]
    pub fn new(controller: Controller, timeout: Duration) -> Self {
        Self { controller, timeout, last_reply: None }
    }

    /// The controller driven by this shell.
    #[must_use]
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Runs one command. Returns `false` when the shell should exit.
    pub async fn execute(&mut self, command: ShellCommand) -> bool {
        match command {
            ShellCommand::Empty => {}
            ShellCommand::Scan => {
                let outcome = self.controller.scan(tokio::time::sleep(self.timeout)).await;
                tracing::debug!(?outcome, "shell scan finished");
            }
            ShellCommand::Test => {
                self.controller.test_scan().await;
            }
            ShellCommand::List | ShellCommand::Cart => self.controller.refresh(),
            ShellCommand::Remove(barcode) => {
                if !self.controller.remove_ingredient(&barcode) {
                    println!("No ingredient with barcode {barcode}");
                }
            }
            ShellCommand::Clear => self.controller.clear_ingredients(),
            ShellCommand::Mode(None) => println!("Mode: {:?}", self.controller.mode()),
            ShellCommand::Mode(Some(mode)) => self.controller.set_mode(mode),
            ShellCommand::Ask(prompt) => self.ask(&prompt).await,
            ShellCommand::Shop => self.shop().await,
            ShellCommand::Add(id) => {
                // Failures are already on the status line.
                let _ = self.controller.add_listed_product(&id);
            }
            ShellCommand::Qty { id, delta } => {
                if self.controller.change_quantity(&id, delta).is_none() {
                    println!("{id} is no longer in the cart");
                }
            }
            ShellCommand::Rm(id) => {
                if !self.controller.remove_from_cart(&id) {
                    println!("{id} is not in the cart");
                }
            }
            ShellCommand::ClearCart { confirmed } => {
                if !self.controller.clear_cart(confirmed) {
                    println!("Type 'clear-cart yes' to empty the cart");
                }
            }
            ShellCommand::Reset => {
                self.last_reply = None;
                self.controller.reset();
            }
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit => return false,
        }
        true
    }

    async fn ask(&mut self, prompt: &str) {
        let Ok(reply) = self.controller.ask(prompt).await else {
            return;
        };
        println!("{}", reply.text);
        if !reply.used_ingredients.is_empty() {
            let used = reply.used_ingredients.join(", ");
            println!("Recipe created using your scanned ingredients: {used}");
        }
        if reply.offers_shopping_list {
            let dish = reply.dish_name.as_deref().unwrap_or("this answer");
            println!("Type 'shop' to generate a shopping list for \"{dish}\"");
        }
        self.last_reply = Some(reply);
    }

    async fn shop(&mut self) {
        let Some(reply) = self.last_reply.as_ref().filter(|reply| reply.offers_shopping_list)
        else {
            println!("Ask for a dish in light mode first");
            return;
        };
        let (text, dish) = (reply.text.clone(), reply.dish_name.clone());
        // Errors are already on the status line.
        let _ = self.controller.generate_shopping_list(&text, dish.as_deref()).await;
    }
}

/// Execute the `shell` command, reading commands from stdin until `quit`
/// or end of input.
///
/// # Errors
///
/// Returns an error string if stdin cannot be read.
pub async fn run(ctx: ServiceContext, config: &Config, timeout: Duration) -> Result<(), String> {
    let mut shell = Shell::new(Controller::new(ctx, config), timeout);
    shell.controller().refresh();
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("pantry> ");
        let _ = std::io::stdout().flush();

        let Some(line) = lines.next_line().await.map_err(|e| format!("Failed to read input: {e}"))?
        else {
            return Ok(());
        };
        match ShellCommand::parse(&line) {
            Ok(command) => {
                if !shell.execute(command).await {
                    return Ok(());
                }
            }
            Err(message) => println!("{message}"),
        }
    }
}
