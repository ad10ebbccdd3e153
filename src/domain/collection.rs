/// The pre-generated JSON arrays served as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Obesity,
    Poverty,
    Fpm,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Collection::Obesity, Collection::Poverty, Collection::Fpm];

    pub fn name(&self) -> &'static str {
        match self {
            Collection::Obesity => "obesity",
            Collection::Poverty => "poverty",
            Collection::Fpm => "fpm",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.name())
    }

    /// Every request path that serves this collection. The `@..` forms are
    /// requested literally by an external dashboard.
    pub fn route_paths(&self) -> [String; 4] {
        let name = self.name();
        [
            format!("/{}", name),
            format!("/api/{}", name),
            format!("/@../{}.json", name),
            format!("/api/@../{}.json", name),
        ]
    }

    pub fn from_path(path: &str) -> Option<Collection> {
        Collection::ALL
            .into_iter()
            .find(|collection| collection.route_paths().iter().any(|p| p == path))
    }
}
