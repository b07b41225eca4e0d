/// Navigation surface: one route per screen.
///
/// Paths mirror the web routes (`/dashboard`, `/games/<name>`, ...) so
/// the same names show up in logs and in the session gate.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameId {
    Maze,
    CodeMaze,
    GraphNav,
    CodeBattle,
    AlgorithmRace,
    RegexTrainer,
    StackAttack,
    BlockDrop,
}

impl GameId {
    pub const ALL: [GameId; 8] = [
        GameId::Maze, GameId::CodeMaze, GameId::GraphNav, GameId::CodeBattle,
        GameId::AlgorithmRace, GameId::RegexTrainer, GameId::StackAttack, GameId::BlockDrop,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            GameId::Maze => "maze",
            GameId::CodeMaze => "code-maze",
            GameId::GraphNav => "graph-navigator",
            GameId::CodeBattle => "code-battle",
            GameId::AlgorithmRace => "algorithm-racing",
            GameId::RegexTrainer => "regex-trainer",
            GameId::StackAttack => "stack-attack",
            GameId::BlockDrop => "block-drop",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameId::Maze => "Maze Escape",
            GameId::CodeMaze => "Code Maze",
            GameId::GraphNav => "Graph Navigator",
            GameId::CodeBattle => "Code Battle",
            GameId::AlgorithmRace => "Algorithm Racing",
            GameId::RegexTrainer => "Regex Trainer",
            GameId::StackAttack => "Stack Attack",
            GameId::BlockDrop => "Block Drop",
        }
    }

    pub fn from_slug(slug: &str) -> Option<GameId> {
        GameId::ALL.iter().copied().find(|g| g.slug() == slug)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Route {
    Root,
    Login,
    Signup,
    Dashboard,
    Store,
    SystemDesign,
    DsaVisualization(String),
    Game(GameId),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.trim().trim_end_matches('/');
        let parts: Vec<&str> = trimmed.split('/').filter(|p| !p.is_empty()).collect();
        match parts.as_slice() {
            [] => Route::Root,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            ["dashboard"] => Route::Dashboard,
            ["store"] => Route::Store,
            ["system-design"] => Route::SystemDesign,
            ["dsa-visualization", topic] => Route::DsaVisualization(topic.to_string()),
            ["games", name] => match GameId::from_slug(name) {
                Some(g) => Route::Game(g),
                None => Route::NotFound(path.to_string()),
            },
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".into(),
            Route::Login => "/login".into(),
            Route::Signup => "/signup".into(),
            Route::Dashboard => "/dashboard".into(),
            Route::Store => "/store".into(),
            Route::SystemDesign => "/system-design".into(),
            Route::DsaVisualization(topic) => format!("/dsa-visualization/{}", topic),
            Route::Game(g) => format!("/games/{}", g.slug()),
            Route::NotFound(p) => p.clone(),
        }
    }

    /// Screens that handle authentication themselves.
    pub fn is_auth(&self) -> bool {
        matches!(self, Route::Login | Route::Signup)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_round_trip() {
        let routes = [
            Route::Root,
            Route::Login,
            Route::Dashboard,
            Route::DsaVisualization("sorting".into()),
            Route::Game(GameId::AlgorithmRace),
            Route::Game(GameId::StackAttack),
        ];
        for r in routes {
            assert_eq!(Route::parse(&r.path()), r);
        }
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(Route::parse("/games/chess"), Route::NotFound("/games/chess".into()));
        assert_eq!(Route::parse("/a/b/c"), Route::NotFound("/a/b/c".into()));
    }

    #[test]
    fn trailing_slash_is_tolerated() {
        assert_eq!(Route::parse("/dashboard/"), Route::Dashboard);
        assert_eq!(Route::parse(""), Route::Root);
    }
}
