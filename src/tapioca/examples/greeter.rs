use std::convert::Infallible;
use std::sync::Arc;

use tapioca::prelude::*;
use tapioca::reflect::BoxError;

fn main() {
    let mut container = Container::init(AppModule::new("greeter")).unwrap();

    let app = container.new::<App>(args![]).unwrap();
    app.run();

    let greeter = container.new::<dyn Greeter>(args![]).unwrap();
    container
        .tap::<()>(
            Callable::function(|logger: Arc<dyn Logger>, Arg(name): Arg<String>| {
                logger.log(&format!("{} greets {name} from a closure", greeter.language()));
                Ok::<_, Infallible>(())
            }),
            args![String::from("tapioca")],
        )
        .unwrap();

    container
        .tap::<()>(Callable::path("App::farewell"), args![])
        .unwrap();
}

struct AppModule {
    app_name: &'static str,
}

impl AppModule {
    fn new(app_name: &'static str) -> Self {
        Self { app_name }
    }
}

impl Module for AppModule {
    fn configure(&self, container: &mut Container) -> Result<(), BoxError> {
        container.share(Arc::new(AppName(self.app_name)));
        container.bind::<dyn Logger, ConsoleLogger>()?;
        container.bind::<dyn Greeter, EnglishGreeter>()?;
        container.register::<App>();
        Ok(())
    }
}

struct AppName(&'static str);

trait Logger: Send + Sync + 'static {
    fn log(&self, message: &str);
}

struct ConsoleLogger {
    app_name: Arc<AppName>,
}

#[injectable(singleton, implements(dyn Logger))]
impl ConsoleLogger {
    #[inject]
    pub fn new(app_name: Arc<AppName>) -> Self {
        Self { app_name }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        eprintln!("[{}] {}", self.app_name.0, message);
    }
}

trait Greeter: Send + Sync + 'static {
    fn language(&self) -> &'static str;

    fn greet(&self);
}

struct EnglishGreeter {
    logger: Arc<dyn Logger>,
    greeting: String,
}

#[injectable(implements(dyn Greeter))]
impl EnglishGreeter {
    #[inject]
    fn new(
        logger: Arc<dyn Logger>,
        #[default(String::from("Hello World!"))] greeting: String,
    ) -> Self {
        Self { logger, greeting }
    }
}

impl Greeter for EnglishGreeter {
    fn language(&self) -> &'static str {
        "English"
    }

    fn greet(&self) {
        self.logger.log(&self.greeting);
    }
}

struct App {
    logger: Arc<dyn Logger>,
    greeter: Arc<dyn Greeter>,
}

#[injectable]
impl App {
    #[inject]
    fn new(logger: Arc<dyn Logger>, greeter: Arc<dyn Greeter>) -> Self {
        Self { logger, greeter }
    }

    fn run(&self) {
        self.logger.log("Greeting from tapioca managed objects:");
        self.greeter.greet();
    }

    #[callable]
    fn farewell(logger: Arc<dyn Logger>) {
        logger.log("Goodbye!");
    }
}
