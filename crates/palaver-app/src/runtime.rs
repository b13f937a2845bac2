//! Orchestration loop.
//!
//! [`Runtime`] owns the [`App`] state machine, the channel state machine,
//! and the subscription registry, and drives them with I/O supplied by a
//! [`Driver`]. All state transitions happen on this single loop; handlers
//! registered in the subscription registry forward inbound events into an
//! inbox drained by the same loop, so no event is ever processed
//! concurrently with another.

use std::collections::VecDeque;

use palaver_client::{
    ChannelAction, ChannelClient, Credential, DecodeError, StoreError, Subscriptions, TokenStore,
};
use palaver_proto::{EventKind, InboundEvent};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{App, AppAction, Command, Driver, TransportEvent};

/// Fatal runtime failures. Everything recoverable (rejected logins,
/// transport drops, malformed frames) is absorbed into application state
/// instead.
#[derive(Debug, Error)]
pub enum RuntimeError<E> {
    /// The driver's command source failed.
    #[error("driver failure: {0}")]
    Driver(E),

    /// The token store failed outside of login/logout, where failures are
    /// absorbed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Orchestration loop wiring app, channel, and subscriptions to a driver.
pub struct Runtime<D: Driver, S: TokenStore> {
    driver: D,
    store: S,
    app: App<D::Instant>,
    channel: ChannelClient,
    subscriptions: Subscriptions,
    inbox: mpsc::UnboundedReceiver<InboundEvent>,
}

impl<D: Driver, S: TokenStore> Runtime<D, S> {
    /// Build a runtime and register the inbound event handlers.
    ///
    /// Handlers are registered exactly once here and survive any number of
    /// reconnects; the channel's lifecycle never touches the registry.
    pub fn new(driver: D, store: S) -> Self {
        let (tx, inbox) = mpsc::unbounded_channel();
        let mut subscriptions = Subscriptions::new();
        for kind in [
            EventKind::Connected,
            EventKind::Message,
            EventKind::PresenceSnapshot,
            EventKind::Typing,
            EventKind::ServerError,
        ] {
            let tx = tx.clone();
            subscriptions.on(kind, move |event| {
                // Receiver drop means the runtime is shutting down.
                let _ = tx.send(event);
            });
        }

        Self {
            driver,
            store,
            app: App::new(),
            channel: ChannelClient::new(),
            subscriptions,
            inbox,
        }
    }

    /// Restore a persisted session, if any.
    ///
    /// A stored token that no longer decodes is cleared and the user is
    /// asked to log in again; no connection attempt is made.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Store`] if the store cannot be read.
    pub async fn resume(&mut self) -> Result<(), RuntimeError<D::Error>> {
        let Some(token) = self.store.load()? else {
            return Ok(());
        };
        self.authenticate(Credential::new(token)).await;
        Ok(())
    }

    /// Run until the user quits.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] on a fatal driver or store failure.
    pub async fn run(&mut self) -> Result<(), RuntimeError<D::Error>> {
        self.resume().await?;
        self.driver.render(&self.app);
        loop {
            if !self.step().await? {
                return Ok(());
            }
        }
    }

    /// One pass over both event sources plus the periodic tick.
    ///
    /// Returns `false` once the user quits.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError::Driver`] if the command source fails.
    pub async fn step(&mut self) -> Result<bool, RuntimeError<D::Error>> {
        while let Some(event) = self.driver.poll_transport().await {
            self.handle_transport(event).await;
        }

        if let Some(command) = self
            .driver
            .poll_command()
            .await
            .map_err(RuntimeError::Driver)?
        {
            if matches!(command, Command::Quit) {
                // Quit tears the transport down but keeps the stored
                // token so the session resumes on the next launch.
                self.execute(vec![AppAction::Disconnect]).await;
                return Ok(false);
            }
            self.handle_command(command).await;
        }

        let actions = self.app.tick(self.driver.now());
        self.execute(actions).await;
        Ok(true)
    }

    /// Apply a user command.
    pub async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Login { username, password } => {
                match self.driver.login(&username, &password).await {
                    Ok(token) => {
                        if let Err(e) = self.store.save(&token) {
                            tracing::warn!(error = %e, "failed to persist token");
                        }
                        self.authenticate(Credential::new(token)).await;
                    },
                    Err(e) => {
                        self.app.set_status(e.to_string());
                        self.driver.render(&self.app);
                    },
                }
            },
            Command::Register { username, password } => {
                match self.driver.register(&username, &password).await {
                    Ok(()) => self.app.set_status("account created, you can now log in"),
                    Err(e) => self.app.set_status(e.to_string()),
                }
                self.driver.render(&self.app);
            },
            Command::Logout => {
                let actions = self.app.logout();
                self.execute(actions).await;
            },
            Command::SwitchRoom(room) => {
                let actions = self.app.switch_room(room);
                self.execute(actions).await;
            },
            Command::Send => {
                let actions = self.app.send();
                self.execute(actions).await;
            },
            Command::InputChanged(text) => {
                let actions = self.app.input_changed(text);
                self.execute(actions).await;
            },
            Command::Quit => {},
        }
    }

    /// Apply a transport notification to the channel state machine.
    pub async fn handle_transport(&mut self, event: TransportEvent) {
        let mut queue = VecDeque::new();
        match event {
            TransportEvent::Opened => {
                let actions = self.channel.transport_opened();
                self.apply_channel(actions, &mut queue).await;
            },
            TransportEvent::Closed => {
                let actions = self.channel.transport_closed();
                self.apply_channel(actions, &mut queue).await;
                queue.extend(self.app.channel_closed());
            },
            TransportEvent::Frame(raw) => match self.channel.handle_frame(&raw) {
                Ok(actions) => self.apply_channel(actions, &mut queue).await,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping malformed frame");
                },
            },
        }
        self.drain(queue).await;
    }

    /// Decode a credential into a session and kick off the connection.
    ///
    /// A credential that fails to decode clears the store, per the rule
    /// that a token which cannot yield an identity must not be retained or
    /// presented to the server.
    async fn authenticate(&mut self, credential: Credential) {
        match self.app.authenticate(credential) {
            Ok(actions) => self.execute(actions).await,
            Err(e) => {
                if let Err(clear) = self.store.clear() {
                    tracing::warn!(error = %clear, "failed to clear rejected token");
                }
                let status = match e {
                    DecodeError::Expired => "session expired, please log in again",
                    DecodeError::Malformed(_) | DecodeError::MissingIdentity => {
                        "stored session is invalid, please log in again"
                    },
                };
                self.app.set_status(status);
                self.driver.render(&self.app);
            },
        }
    }

    /// Execute app actions, including any follow-on actions produced by
    /// events the channel delivers along the way.
    async fn execute(&mut self, actions: Vec<AppAction>) {
        self.drain(actions.into()).await;
    }

    async fn drain(&mut self, mut queue: VecDeque<AppAction>) {
        while let Some(action) = queue.pop_front() {
            match action {
                AppAction::Render => self.driver.render(&self.app),
                AppAction::Connect { credential } => {
                    self.channel.configure_auth(credential);
                    let mut actions = self.channel.disconnect();
                    match self.channel.connect() {
                        Ok(connect) => actions.extend(connect),
                        Err(e) => tracing::warn!(error = %e, "connect refused"),
                    }
                    self.apply_channel(actions, &mut queue).await;
                },
                AppAction::Disconnect => {
                    let actions = self.channel.disconnect();
                    self.apply_channel(actions, &mut queue).await;
                },
                AppAction::Emit(event) => {
                    let actions = self.channel.emit(event);
                    self.apply_channel(actions, &mut queue).await;
                },
                AppAction::ClearToken => {
                    if let Err(e) = self.store.clear() {
                        tracing::warn!(error = %e, "failed to clear token");
                    }
                },
            }
        }
    }

    /// Execute channel actions, queuing any app actions that delivered
    /// events produce.
    async fn apply_channel(
        &mut self,
        actions: Vec<ChannelAction>,
        queue: &mut VecDeque<AppAction>,
    ) {
        for action in actions {
            match action {
                ChannelAction::Open { token } => {
                    if let Err(e) = self.driver.open_channel(&token).await {
                        tracing::warn!(error = %e, "failed to dial server");
                        self.app.set_status("connection failed");
                        queue.push_back(AppAction::Render);
                    }
                },
                ChannelAction::Transmit(packet) => {
                    if let Err(e) = self.driver.send_packet(packet).await {
                        tracing::warn!(error = %e, "failed to transmit packet");
                    }
                },
                ChannelAction::Deliver(event) => {
                    if !self.subscriptions.dispatch(event) {
                        continue;
                    }
                    let now = self.driver.now();
                    while let Ok(event) = self.inbox.try_recv() {
                        queue.extend(self.app.handle_inbound(event, now));
                    }
                },
                ChannelAction::Close => self.driver.close_channel().await,
            }
        }
    }

    /// Application state, for inspection.
    pub fn app(&self) -> &App<D::Instant> {
        &self.app
    }

    /// Driver, for inspection.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Driver, for feeding scripted input.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
