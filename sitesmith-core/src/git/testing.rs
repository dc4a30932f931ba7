//! Scratch repositories for tests

use std::path::Path;

use git2::{Oid, Repository, RepositoryInitOptions, Signature};

/// Initialise a repository on `main` with a local identity
pub fn init_repo(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(path, &opts).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }
    repo
}

/// Initialise a bare repository usable as a push/pull target
pub fn init_bare(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main").bare(true);
    Repository::init_opts(path, &opts).unwrap()
}

/// Write `name` into the working tree without staging it
pub fn write_file(repo: &Repository, name: &str, content: &str) {
    let path = repo.workdir().unwrap().join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

/// Write, stage and commit a single file on the current branch
pub fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
    write_file(repo, name, content);

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::now("Test User", "test@example.com").unwrap();
    let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
    let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .unwrap()
}
