use hangar::{
    asset,
    input::{InputEvent, KeyCode, Pointer},
    math::Vec2,
    nonfatal_error,
    tread::{
        defs,
        widget::{Button, Image, Label, Widget},
        Alignment, ContentMode, TextStyle,
    },
    Game, GameLoader, RenderingContext, ShapeRenderer,
};
use std::{cell::Cell, rc::Rc, time::Duration};

struct WidgetsGame {
    renderer: ShapeRenderer,
    pointer: Pointer,
    title: Label,
    counter: Label,
    tank: Image,
    fire: Button,
    turret: Button,
    shots: Rc<Cell<u32>>,
}

impl WidgetsGame {
    fn new(renderer: ShapeRenderer, texture: hangar::tread::Texture) -> Self {
        let mut title = Label::with_text("tiny tanks");
        title.set_character_size(48);
        title.set_text_style(TextStyle::BOLD | TextStyle::UNDERLINED);
        title.set_background_color(defs::TRANSPARENT);
        title.set_position(Vec2::new(64., 48.));

        let mut counter = Label::with_text("Shots: 0");
        counter.set_margins(8., 8., 12., 12.);
        counter.set_border_thickness(2.);
        counter.set_border_color(defs::BLACK);
        counter.set_background_color(defs::WHITE);
        counter.set_position(Vec2::new(64., 160.));

        let mut tank = Image::with_vertices(texture, 6);
        tank.set_size(Vec2::new(160., 160.));
        tank.set_border_thickness(0.02);
        tank.set_border_color(defs::BLACK);
        tank.set_origin(Vec2::ZERO);
        tank.set_position(Vec2::new(600., 400.));

        let shots = Rc::new(Cell::new(0));
        let mut fire = Button::rectangle(Vec2::new(160., 48.))
            .with_text("Fire!")
            .with_background(defs::DEFAULT_WIDGET_BACKGROUND);
        fire.set_text_color(defs::WHITE);
        fire.set_margins(4., 4., 8., 8.);
        fire.set_position(Vec2::new(64., 260.));
        let shots1 = shots.clone();
        fire.add_pressed_listener(move |&()| shots1.set(shots1.get() + 1));

        let mut turret = Button::circle(40., 24).with_text("Turn");
        turret.set_content_mode(ContentMode::Fixed);
        turret.set_text_alignment(Alignment::Center);
        turret.set_text_color(defs::WHITE);
        turret.set_position(Vec2::new(64., 360.));

        WidgetsGame {
            renderer,
            pointer: Pointer::default(),
            title,
            counter,
            tank,
            fire,
            turret,
            shots,
        }
    }
}

impl Game for WidgetsGame {
    fn set_screen_size(&mut self, width: f32, height: f32) {
        self.renderer.set_screen_size(width, height);
    }

    fn handle_event(&mut self, event: InputEvent) {
        self.pointer.handle_event(event);
        if let InputEvent::Key {
            key: KeyCode::Escape,
            pressed: true,
        } = event
        {
            hangar::window::request_quit();
        }
    }

    fn update(&mut self, _frame_time: Duration) {
        let bounds = self.fire.global_bounds(&mut self.renderer);
        self.fire.handle_pointer(self.pointer.state_in(bounds));
        let bounds = self.turret.global_bounds(&mut self.renderer);
        self.turret.handle_pointer(self.pointer.state_in(bounds));
        if self.turret.is_hovered() {
            self.turret.rotate(0.05);
            self.tank.rotate(0.01);
        }
        self.counter
            .set_text(&format!("Shots: {}", self.shots.get()));
    }

    fn render(&mut self, context: &mut RenderingContext) {
        self.title.draw(&mut self.renderer);
        self.counter.draw(&mut self.renderer);
        self.tank.draw(&mut self.renderer);
        self.fire.draw(&mut self.renderer);
        self.turret.draw(&mut self.renderer);
        self.renderer.render_pass(context);
    }
}

impl GameLoader for WidgetsGame {
    type Assets = hangar::tread::Texture;
    type Game = Self;

    fn load(
        context: &mut RenderingContext,
        renderer: &mut ShapeRenderer,
    ) -> asset::Result<Self::Assets> {
        match renderer.load_texture(context, asset::TEXTURES_DIR, asset::DEFAULT_TEXTURE) {
            Ok(texture) => Ok(texture),
            Err(error) => {
                nonfatal_error(&error.to_string());
                Ok(renderer.invalid_texture())
            }
        }
    }

    fn create_game(renderer: ShapeRenderer, texture: Self::Assets) -> Self::Game {
        WidgetsGame::new(renderer, texture)
    }
}

fn main() {
    hangar::run_game::<WidgetsGame>("tiny tanks");
}
