pub mod server;
pub mod token;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Token(token::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        match self {
            Self::Server(args) => server::execute(args).await,
            Self::Token(args) => token::execute(args).await,
        }
    }
}
