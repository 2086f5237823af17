use crate::{
    command::{Command, parse_command},
    input::InputLine,
    reply,
    session::{BubbleLease, CAPABILITIES, ChatSession, GREETING, GREETING_GAP},
    speech::Speaker,
    view::{self, ViewSnap},
};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::{
    event::{Event as CtEvent, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};
use uuid::Uuid;
use woodchat_actors::{
    actor::{Actor, Addr, Context},
    system::ShutdownHandle,
};
use woodchat_common::AskBackend;
use woodchat_render::{Message, RenderToken, Renderer};

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum TuiMsg {
    InputEvent(CtEvent),
    Tick,
    Submit(String),
    /// A bot message to show. `reply` marks answers to a question, which
    /// also retire one typing indicator.
    Bot {
        epoch: u64,
        message: Message,
        reply: bool,
    },
    RenderDone {
        id: Uuid,
        token: RenderToken,
    },
    OpError(String),
    TogglePanel,
    ClosePanel,
    Refresh,
    Shutdown,
}

pub struct TuiActor {
    session: ChatSession,

    // deps
    backend: Arc<dyn AskBackend>,
    renderer: Renderer,
    speaker: Arc<dyn Speaker>,

    // terminal
    term: Terminal<CrosstermBackend<Stdout>>,
    tick_rate: Duration,
    last_tick: Instant,

    // ui state
    input: InputLine,
    scroll: usize, // from bottom
    dirty: bool,
    spin_idx: usize,

    shutdown: ShutdownHandle,
}

impl TuiActor {
    pub fn new(
        backend: Arc<dyn AskBackend>,
        renderer: Renderer,
        speaker: Arc<dyn Speaker>,
        shutdown: ShutdownHandle,
    ) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend_term = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend_term)?;
        term.clear()?;

        info!(backend = backend.describe(), "tui.start");
        Ok(Self {
            session: ChatSession::new(),
            backend,
            renderer,
            speaker,
            term,
            tick_rate: Duration::from_millis(250),
            last_tick: Instant::now(),
            input: InputLine::default(),
            scroll: 0,
            dirty: true,
            spin_idx: 0,
            shutdown,
        })
    }

    fn spinner(&self) -> &'static str {
        BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
    }

    fn animating(&self) -> bool {
        self.session.is_typing() || self.session.active_renders() > 0
    }

    fn draw(&mut self) -> Result<()> {
        let snap = ViewSnap {
            panel_open: self.session.is_open(),
            input: self.input.as_str().to_string(),
            input_cursor: self.input.cursor(),
            lines: self.session.transcript().lines(),
            scroll: self.scroll,
            typing: self.session.is_typing(),
            renders: self.session.active_renders(),
            spinner: self.spinner(),
            backend: self.backend.describe().to_string(),
        };
        view::draw(&mut self.term, &snap)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<TuiMsg> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Some(TuiMsg::Shutdown),
            (KeyCode::Char('t'), KeyModifiers::CONTROL) => return Some(TuiMsg::TogglePanel),
            _ if !self.session.is_open() => {}
            (KeyCode::Char('x'), KeyModifiers::CONTROL) => return Some(TuiMsg::ClosePanel),
            (KeyCode::Char('r'), KeyModifiers::CONTROL) => return Some(TuiMsg::Refresh),
            (KeyCode::PageUp, _) => self.scroll = self.scroll.saturating_add(5),
            (KeyCode::PageDown, _) => self.scroll = self.scroll.saturating_sub(5),
            (KeyCode::Up, _) => self.scroll = self.scroll.saturating_add(1),
            (KeyCode::Down, _) => self.scroll = self.scroll.saturating_sub(1),
            (KeyCode::Enter, _) => {
                self.dirty = true;
                return Some(TuiMsg::Submit(self.input.take()));
            }
            (KeyCode::Left, _) => self.input.left(),
            (KeyCode::Right, _) => self.input.right(),
            (KeyCode::Home, _) => self.input.home(),
            (KeyCode::End, _) => self.input.end(),
            (KeyCode::Backspace, _) => self.input.backspace(),
            (KeyCode::Delete, _) => self.input.delete(),
            (KeyCode::Esc, _) => self.input.clear(),
            (KeyCode::Char(ch), m) if !m.contains(KeyModifiers::CONTROL) => self.input.insert(ch),
            _ => {}
        }
        self.dirty = true;
        None
    }

    /// Queue the two greeting lines for the current epoch.
    fn greet(&mut self, me: Addr<TuiActor>) {
        let epoch = self.session.epoch();
        let _ = me.try_send(TuiMsg::Bot {
            epoch,
            message: Message::plain(GREETING),
            reply: false,
        });
        tokio::spawn(async move {
            tokio::time::sleep(GREETING_GAP).await;
            let _ = me
                .send(TuiMsg::Bot {
                    epoch,
                    message: Message::plain(CAPABILITIES),
                    reply: false,
                })
                .await;
        });
    }

    fn route_submit(&mut self, line: String, me: Addr<TuiActor>) {
        let question = line.trim().to_string();
        if question.is_empty() {
            return;
        }

        if question.starts_with('/') {
            match parse_command(&question) {
                Command::Refresh => {
                    let _ = me.try_send(TuiMsg::Refresh);
                }
                Command::Close => self.session.close_panel(),
                Command::Quit => {
                    let _ = me.try_send(TuiMsg::Shutdown);
                }
                Command::Help => {
                    self.session.notice("Commands: /refresh, /close, /quit");
                    self.session
                        .notice("Keys: Ctrl-T toggle • Ctrl-X close • Ctrl-R refresh • Ctrl-Q quit");
                }
                // Anything else is just a question that happens to start with '/'.
                Command::Unknown(_) => self.ask(question, me),
            }
            self.dirty = true;
            return;
        }

        self.ask(question, me);
    }

    fn ask(&mut self, question: String, me: Addr<TuiActor>) {
        let epoch = self.session.submit(&question);
        self.scroll = 0;
        self.dirty = true;

        let backend = self.backend.clone();
        tokio::spawn(async move {
            let message = reply::compose_reply(backend.as_ref(), &question).await;
            let _ = me
                .send(TuiMsg::Bot {
                    epoch,
                    message,
                    reply: true,
                })
                .await;
        });
    }

    fn show_bot(&mut self, message: Message, me: Addr<TuiActor>) {
        let BubbleLease {
            id,
            mut sink,
            token,
        } = self.session.open_bubble();
        self.scroll = 0;
        self.dirty = true;

        let renderer = self.renderer.clone();
        let speaker = self.speaker.clone();
        tokio::spawn(async move {
            let mut spoken = None;
            renderer
                .render(&message, &mut sink, &token, |text| spoken = Some(text))
                .await;
            if let Some(text) = spoken
                && let Err(err) = speaker.speak(&text).await
            {
                warn!(error = %err, "tui.speech_failed");
            }
            let _ = me.send(TuiMsg::RenderDone { id, token }).await;
        });
    }

    fn restore_terminal(&mut self) {
        disable_raw_mode().ok();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        self.term.show_cursor().ok();
    }
}

impl Drop for TuiActor {
    fn drop(&mut self) {
        self.restore_terminal();
    }
}

#[async_trait]
impl Actor for TuiActor {
    type Msg = TuiMsg;

    async fn handle(&mut self, msg: Self::Msg, ctx: &mut Context<Self>) -> Result<()> {
        let Some(me) = ctx.addr() else {
            ctx.stop();
            return Ok(());
        };

        match msg {
            TuiMsg::InputEvent(ev) => match ev {
                CtEvent::Key(k) => {
                    if let Some(next) = self.handle_key(k) {
                        let _ = me.try_send(next);
                    }
                }
                CtEvent::Resize(..) => self.dirty = true,
                _ => {}
            },
            TuiMsg::Submit(line) => self.route_submit(line, me),
            TuiMsg::Bot {
                epoch,
                message,
                reply,
            } => {
                let current = if reply {
                    self.session.reply_arrived(epoch)
                } else {
                    epoch == self.session.epoch()
                };
                if current {
                    self.show_bot(message, me);
                }
            }
            TuiMsg::RenderDone { id, token } => {
                self.session.render_finished(id, &token);
                self.dirty = true;
            }
            TuiMsg::OpError(e) => {
                self.session.error(format!("× Error: {e}"));
                self.dirty = true;
            }
            TuiMsg::TogglePanel => {
                if self.session.toggle_panel() {
                    self.greet(me);
                }
                self.dirty = true;
            }
            TuiMsg::ClosePanel => {
                self.session.close_panel();
                self.dirty = true;
            }
            TuiMsg::Refresh => {
                self.session.refresh();
                self.scroll = 0;
                self.speaker.silence();
                self.greet(me);
                self.dirty = true;
            }
            TuiMsg::Tick => {
                if self.animating() {
                    self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
                    self.dirty = true;
                }
                if self.dirty || self.last_tick.elapsed() >= self.tick_rate {
                    self.draw()?;
                    self.last_tick = Instant::now();
                    self.dirty = false;
                }
            }
            TuiMsg::Shutdown => {
                debug!("tui.shutdown");
                self.speaker.silence();
                self.session.refresh();
                self.restore_terminal();
                self.shutdown.signal();
                ctx.stop();
            }
        }

        Ok(())
    }
}
