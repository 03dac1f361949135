use env_logger::{Builder, Target};
use iced::widget::image::Handle;
use iced::widget::{button, canvas, column, container, row, text, Stack};
use iced::{keyboard, window, Alignment, Element, Length, Subscription, Task, Theme};
use log::LevelFilter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

mod carousel;
mod config;
mod error;
mod photos;
mod ui;

use carousel::{Carousel, Layout, SourceItem, SwipeDirection};
use config::Config;
use photos::feed::{self, FeedClient};
use photos::loader::{self, ImageCache, ImageState};
use ui::gesture_layer::GestureLayer;

/// Main application state
struct Polaroids {
    config: Config,
    carousel: Carousel,
    /// Curated photos, kept to re-mix whenever the guest list changes
    curated: Vec<SourceItem>,
    /// Image refs of the last applied guest list; None until one arrives
    guest_refs: Option<Vec<String>>,
    feed: Option<FeedClient>,
    /// Shared client for photo downloads
    http: reqwest::Client,
    images: ImageCache,
    placeholder: Handle,
    /// Status message to display to the user
    status: String,
    /// Bumped per fetch; stale responses are dropped
    feed_generation: u64,
    loading: bool,
    /// Clock used for the last layout
    now: Instant,
    rng: StdRng,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// Curated photos scanned from disk
    CuratedLoaded(Vec<SourceItem>),
    /// Time to re-query the photo feed
    RefreshFeed,
    /// Feed response tagged with the fetch generation
    FeedLoaded(u64, Result<Vec<SourceItem>, String>),
    ImageLoaded(String, Result<Handle, String>),
    Next,
    Previous,
    DragStarted,
    /// Horizontal drag offset from the press point
    Dragged(f32),
    DragReleased,
    Frame(Instant),
    WindowClosed,
}

impl Polaroids {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = Config::load();

        let feed = if config.feed.is_usable() {
            match FeedClient::new(config.feed.clone()) {
                Ok(client) => Some(client),
                Err(e) => {
                    log::warn!("⚠️  Photo feed disabled: {}", e);
                    None
                }
            }
        } else {
            log::info!("📷 No photo feed configured, showing curated photos only");
            None
        };

        let placeholder = loader::placeholder(config.images.photo_width_px).into_handle();

        let app = Polaroids {
            carousel: Carousel::new(Vec::new(), &config.carousel),
            curated: Vec::new(),
            guest_refs: None,
            feed,
            http: reqwest::Client::new(),
            images: ImageCache::new(),
            placeholder,
            status: "Loading photos...".to_string(),
            feed_generation: 0,
            loading: true,
            now: Instant::now(),
            rng: StdRng::from_os_rng(),
            config,
        };

        let curated = app.config.curated.clone();
        (app, Task::perform(photos::load_curated(curated), Message::CuratedLoaded))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::CuratedLoaded(items) => {
                log::info!("🎞️  {} curated photos ready", items.len());
                self.curated = items.clone();
                self.loading = self.feed.is_some();
                self.carousel.replace_items(items);
                self.status = self.summary();

                Task::batch([self.load_visible_images(), self.refresh_feed()])
            }
            Message::RefreshFeed => self.refresh_feed(),
            Message::FeedLoaded(generation, result) => {
                if generation != self.feed_generation {
                    log::debug!("Dropping stale feed response #{}", generation);
                    return Task::none();
                }
                self.loading = false;

                match result {
                    Ok(guest) => self.apply_guest_photos(guest),
                    Err(e) => {
                        // Keep whatever is on screen
                        log::warn!("⚠️  Photo feed failed: {}", e);
                        self.status = "Couldn't reach the guest photos, showing what we have.".to_string();
                        Task::none()
                    }
                }
            }
            Message::ImageLoaded(image_ref, result) => {
                self.images.finish(image_ref, result);
                Task::none()
            }
            Message::Next => self.step(SwipeDirection::Forward),
            Message::Previous => self.step(SwipeDirection::Backward),
            Message::DragStarted => {
                self.now = Instant::now();
                self.carousel.press(self.now);
                Task::none()
            }
            Message::Dragged(offset) => {
                self.now = Instant::now();
                self.carousel.drag_to(offset, self.now);
                Task::none()
            }
            Message::DragReleased => {
                self.now = Instant::now();
                match self.carousel.release(self.now) {
                    Some(direction) => {
                        log::debug!("👆 Swiped {:?}", direction);
                        self.load_visible_images()
                    }
                    None => Task::none(),
                }
            }
            Message::Frame(now) => {
                self.now = now;
                self.carousel.tick(now);
                Task::none()
            }
            Message::WindowClosed => {
                // Orphan any fetch still in flight
                self.feed_generation += 1;
                self.carousel.shutdown();
                Task::none()
            }
        }
    }

    fn step(&mut self, direction: SwipeDirection) -> Task<Message> {
        self.now = Instant::now();
        if self.carousel.step(direction, self.now) {
            self.load_visible_images()
        } else {
            Task::none()
        }
    }

    fn refresh_feed(&mut self) -> Task<Message> {
        let Some(client) = &self.feed else {
            return Task::none();
        };
        self.feed_generation += 1;
        let generation = self.feed_generation;
        log::debug!("🔄 Fetching guest photos (#{})", generation);

        Task::perform(photos::fetch_guest(client.clone()), move |result| {
            Message::FeedLoaded(generation, result)
        })
    }

    /// Re-mix the stack when the guest list actually changed
    fn apply_guest_photos(&mut self, guest: Vec<SourceItem>) -> Task<Message> {
        let refs: Vec<String> = guest.iter().map(|item| item.image_ref.clone()).collect();
        let changed = feed::guest_list_changed(self.guest_refs.as_deref(), &refs);
        self.guest_refs = Some(refs);
        if !changed {
            log::debug!("Guest photos unchanged");
            self.status = self.summary();
            return Task::none();
        }

        log::info!("💌 {} approved guest photos", guest.len());
        let items = feed::combine(guest, &self.curated, &mut self.rng);
        self.carousel.replace_items(items);
        self.images
            .retain(self.carousel.stack().source().iter().map(|item| item.image_ref.as_str()));
        self.status = self.summary();

        self.load_visible_images()
    }

    /// Start loading every image that is on screen or about to be
    fn load_visible_images(&mut self) -> Task<Message> {
        let stack = self.carousel.stack();
        let upcoming = stack.upcoming_sources();
        let refs = stack
            .window()
            .iter()
            .map(|card| card.image_ref.as_str())
            .chain(stack.transition().map(|t| t.departing.image_ref.as_str()))
            .chain(upcoming.iter().map(|item| item.image_ref.as_str()));
        let wanted = self.images.request(refs);

        if wanted.is_empty() {
            return Task::none();
        }
        log::debug!("🖼️  Loading {} photos ({} cached)", wanted.len(), self.images.len());

        let photo_width = self.config.images.photo_width_px;
        Task::batch(wanted.into_iter().map(|image_ref| {
            let load = photos::load_image(image_ref.clone(), self.http.clone(), photo_width);
            Task::perform(load, move |result| Message::ImageLoaded(image_ref.clone(), result))
        }))
    }

    fn summary(&self) -> String {
        let total = self.carousel.stack().source().len();
        match &self.guest_refs {
            Some(guest) if !guest.is_empty() => format!("{} photos, {} from our guests", total, guest.len()),
            _ => format!("{} photos", total),
        }
    }

    fn handle_for(&self, image_ref: &str) -> Handle {
        match self.images.get(image_ref) {
            Some(ImageState::Ready(handle)) => handle.clone(),
            _ => self.placeholder.clone(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let card_size = ui::card_size(self.config.images.photo_width_px);

        let stage: Element<Message> = match self.carousel.layout(self.now) {
            Layout::Empty => ui::polaroid::empty_state(self.loading),
            Layout::Cards(placements) => {
                let mut layers: Vec<Element<Message>> = placements
                    .iter()
                    .map(|placement| ui::polaroid::card(placement, self.handle_for(&placement.card.image_ref)))
                    .collect();

                layers.push(
                    canvas(GestureLayer {
                        outputs: self.carousel.gesture_outputs(),
                        card_size,
                        enabled: placements.iter().any(|placement| placement.is_front),
                    })
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into(),
                );

                Stack::with_children(layers)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into()
            }
        };

        let has_cards = !self.carousel.is_empty();
        let controls = row![
            button("Previous")
                .on_press_maybe(has_cards.then_some(Message::Previous))
                .padding(10),
            button("Next")
                .on_press_maybe(has_cards.then_some(Message::Next))
                .padding(10),
        ]
        .spacing(20);

        let content = column![
            text("Our Polaroids").size(40),
            container(stage)
                .width(Length::Fill)
                .height(Length::Fixed(ui::STAGE_HEIGHT)),
            ui::polaroid::caption_bar(self.carousel.stack().front()),
            controls,
            text(&self.status).size(14),
        ]
        .spacing(20)
        .padding(30)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![
            keyboard::on_key_press(|key, _modifiers| match key {
                keyboard::Key::Named(keyboard::key::Named::ArrowRight) => Some(Message::Next),
                keyboard::Key::Named(keyboard::key::Named::ArrowLeft) => Some(Message::Previous),
                _ => None,
            }),
            window::close_events().map(|_| Message::WindowClosed),
        ];

        if self.carousel.is_animating() {
            subscriptions.push(window::frames().map(Message::Frame));
        }

        if self.feed.is_some() {
            if let Some(interval) = self.config.feed.refresh_interval() {
                subscriptions.push(iced::time::every(interval).map(|_| Message::RefreshFeed));
            }
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        ui::theme()
    }
}

fn init_logger() {
    Builder::new()
        .target(Target::Stdout)
        .filter_level(LevelFilter::Warn)
        .filter_module("wedding_polaroids", LevelFilter::Debug)
        .init();
}

fn main() -> iced::Result {
    if std::env::var("RUST_LOG").is_err() {
        init_logger();
    } else {
        env_logger::init();
    }

    iced::application("Our Polaroids", Polaroids::update, Polaroids::view)
        .subscription(Polaroids::subscription)
        .theme(Polaroids::theme)
        .window_size((720.0, 900.0))
        .centered()
        .run_with(Polaroids::new)
}
