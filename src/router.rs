// Ordered (matcher, handler) table for the leading command tokens.

use crate::args::is_option;

/// How a route recognises its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Leading tokens equal to these words; they are stripped before the
    /// handler runs.
    Prefix(Vec<String>),
    /// Exactly this many tokens, none of them an option (negative numbers
    /// are fine). Nothing is stripped.
    Positionals(usize),
}

#[derive(Debug)]
struct Route<H> {
    matcher: Matcher,
    handler: H,
}

/// A matched route: its handler and the tokens left for it.
#[derive(Debug, PartialEq)]
pub struct Match<'r, 'a, H> {
    pub handler: &'r H,
    pub rest: &'a [String],
}

#[derive(Debug)]
pub struct Router<H> {
    routes: Vec<Route<H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Router { routes: Vec::new() }
    }
}

impl<H> Router<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a whitespace-separated command prefix such as `"list ids"`.
    pub fn register(mut self, prefix: &str, handler: H) -> Self {
        let words = prefix.split_whitespace().map(str::to_string).collect();
        self.routes.push(Route {
            matcher: Matcher::Prefix(words),
            handler,
        });
        self
    }

    pub fn register_positionals(mut self, count: usize, handler: H) -> Self {
        self.routes.push(Route {
            matcher: Matcher::Positionals(count),
            handler,
        });
        self
    }

    /// Longest matching prefix wins (first registered on a tie). Positional
    /// routes are only tried when no prefix matches. `None` means the caller
    /// should take its fallback path.
    pub fn resolve<'r, 'a>(&'r self, argv: &'a [String]) -> Option<Match<'r, 'a, H>> {
        let mut best: Option<(&Route<H>, usize)> = None;
        for route in &self.routes {
            if let Matcher::Prefix(words) = &route.matcher {
                let matched = !words.is_empty()
                    && argv.len() >= words.len()
                    && words.iter().zip(argv).all(|(w, a)| w == a);
                if matched && best.map_or(true, |(_, len)| words.len() > len) {
                    best = Some((route, words.len()));
                }
            }
        }
        if let Some((route, len)) = best {
            return Some(Match {
                handler: &route.handler,
                rest: &argv[len..],
            });
        }

        self.routes.iter().find_map(|route| match route.matcher {
            Matcher::Positionals(count)
                if argv.len() == count && !argv.iter().any(|a| is_option(a)) =>
            {
                Some(Match {
                    handler: &route.handler,
                    rest: argv,
                })
            }
            _ => None,
        })
    }
}
