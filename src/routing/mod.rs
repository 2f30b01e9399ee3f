mod resolver;

pub use resolver::RouteResolver;
