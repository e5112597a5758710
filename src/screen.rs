use std::future::Future;

use futures::future::BoxFuture;
use tokio::task::JoinSet;

/// A unit of asynchronous work owned by a screen. Resolves to the message
/// the screen wants back once the work is done.
pub type Effect<M> = BoxFuture<'static, M>;

pub fn effect<M, F>(future: F) -> Effect<M>
where
    F: Future<Output = M> + Send + 'static,
{
    Box::pin(future)
}

/// A page model: state plus an update function that consumes one message
/// and emits follow-up effects.
pub trait Screen {
    type Message: Send + 'static;

    fn update(&mut self, message: Self::Message) -> Vec<Effect<Self::Message>>;
}

/// Drives one screen's effects. Dropping the runtime aborts every
/// in-flight effect, so a dismounted screen can never write back.
pub struct ScreenRuntime<M> {
    tasks: JoinSet<M>,
}

impl<M: Send + 'static> ScreenRuntime<M> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn_all(&mut self, effects: Vec<Effect<M>>) {
        for effect in effects {
            self.tasks.spawn(effect);
        }
    }

    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// Waits for the next completed effect. Returns `None` once no effects
    /// remain. Aborted effects are skipped silently; a panicking effect is
    /// logged and skipped.
    pub async fn next_message(&mut self) -> Option<M> {
        loop {
            match self.tasks.join_next().await {
                Some(Ok(message)) => return Some(message),
                Some(Err(error)) => {
                    if error.is_panic() {
                        tracing::error!(%error, "screen effect panicked");
                    }
                }
                None => return None,
            }
        }
    }

    /// Feeds completed effects back into the screen until it settles with
    /// nothing left in flight.
    pub async fn run_until_idle<S>(&mut self, screen: &mut S)
    where
        S: Screen<Message = M>,
    {
        while let Some(message) = self.next_message().await {
            let effects = screen.update(message);
            self.spawn_all(effects);
        }
    }
}

impl<M: Send + 'static> Default for ScreenRuntime<M> {
    fn default() -> Self {
        Self::new()
    }
}
