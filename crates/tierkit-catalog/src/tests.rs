use super::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tierkit_core::{Catalog, PackageInfo, RecipeVersion, WorkspacePaths};

static TEST_ROOT_COUNTER: AtomicU64 = AtomicU64::new(0);

#[test]
fn corpus_reads_every_recipe_folder_with_config() {
    let root = test_workspace_root();
    write_recipe(&root, "libx", &[("1.0", "all"), ("2.0", "all")]);
    write_recipe(&root, "liby", &[("1.0", "1.x")]);
    fs::create_dir_all(root.join("recipes").join("notes")).expect("must create dir");
    fs::write(root.join("recipes").join("README.md"), "recipes").expect("must write file");

    let corpus = RecipeCorpus::open(&WorkspacePaths::new(&root, "recipes"));
    let catalog = corpus.load_catalog().expect("catalog must load");

    assert_eq!(
        catalog.package_names().collect::<Vec<_>>(),
        vec!["libx", "liby"]
    );
    let latest = catalog.latest("libx").expect("libx must exist");
    assert_eq!(latest.version.as_str(), "2.0");
    assert_eq!(latest.directory, Path::new("recipes/libx/all"));
    assert_eq!(
        catalog.latest("liby").expect("liby must exist").conanfile_path(),
        Path::new("recipes/liby/1.x/conanfile.py")
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn corpus_aborts_on_malformed_config() {
    let root = test_workspace_root();
    write_recipe(&root, "libx", &[("1.0", "all")]);
    let broken = root.join("recipes").join("broken");
    fs::create_dir_all(&broken).expect("must create dir");
    fs::write(broken.join(RECIPE_CONFIG_FILE), "versions: [1, 2").expect("must write");

    let corpus = RecipeCorpus::open(&WorkspacePaths::new(&root, "recipes"));
    let err = corpus.load_catalog().expect_err("malformed config must abort");
    assert!(
        err.to_string().contains("invalid recipe config"),
        "unexpected error: {err}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn corpus_fails_when_recipes_directory_is_missing() {
    let root = test_workspace_root();
    let corpus = RecipeCorpus::open(&WorkspacePaths::new(&root, "recipes"));
    let err = corpus.load_catalog().expect_err("missing recipes dir must fail");
    assert!(err.to_string().contains("failed to read recipes directory"));
}

#[test]
fn package_of_path_requires_file_inside_package_folder() {
    assert_eq!(
        package_of_path("recipes/libx/all/conanfile.py", "recipes").as_deref(),
        Some("libx")
    );
    assert_eq!(
        package_of_path("recipes/libx/config.yml", "recipes").as_deref(),
        Some("libx")
    );
    assert_eq!(package_of_path("recipes/README.md", "recipes"), None);
    assert_eq!(package_of_path("scripts/libx/run.py", "recipes"), None);
}

#[test]
fn package_of_path_matches_whole_nested_prefix() {
    assert_eq!(
        package_of_path("conan/recipes/libx/all/conanfile.py", "conan/recipes").as_deref(),
        Some("libx")
    );
    assert_eq!(package_of_path("conan/other/x.txt", "conan/recipes"), None);
    assert_eq!(
        package_of_path("conan/recipes/README.md", "conan/recipes"),
        None
    );
    assert_eq!(
        package_of_path("recipes/libx/all/conanfile.py", "conan/recipes"),
        None
    );
}

#[test]
fn modified_packages_reads_nested_recipes_dir() {
    let root = test_workspace_root();
    fs::create_dir_all(&root).expect("must create root");
    git_run(&root, &["init", "--quiet"]);
    let recipe_dir = root.join("conan/recipes/libx/all");
    fs::create_dir_all(&recipe_dir).expect("must create recipe dir");
    fs::write(recipe_dir.join("conanfile.py"), "# recipe\n").expect("must write recipe");
    fs::create_dir_all(root.join("conan/other")).expect("must create dir");
    fs::write(root.join("conan/other/x.txt"), "x\n").expect("must write file");
    git_commit_all(&root, "nested recipes");
    let head = git_head(&root);

    let prefix = WorkspacePaths::new(&root, "conan/recipes")
        .recipes_prefix()
        .expect("must be relative");
    let packages = modified_packages(&root, &prefix, &[head]).expect("must resolve");
    assert_eq!(packages.into_iter().collect::<Vec<_>>(), vec!["libx"]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn modified_packages_reads_commit_diff() {
    let root = test_workspace_root();
    fs::create_dir_all(&root).expect("must create root");
    git_run(&root, &["init", "--quiet"]);

    write_recipe(&root, "libx", &[("1.0", "all")]);
    write_recipe(&root, "liby", &[("1.0", "all")]);
    git_commit_all(&root, "initial recipes");

    let conanfile = root.join("recipes/libx/all/conanfile.py");
    fs::write(&conanfile, "# patched\n").expect("must patch recipe");
    fs::write(root.join("README.md"), "docs\n").expect("must write readme");
    git_commit_all(&root, "patch libx");
    let head = git_head(&root);

    let packages = modified_packages(&root, "recipes", &[head]).expect("must resolve");
    assert_eq!(packages.into_iter().collect::<Vec<_>>(), vec!["libx"]);

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn modified_packages_includes_root_commit_files() {
    let root = test_workspace_root();
    fs::create_dir_all(&root).expect("must create root");
    git_run(&root, &["init", "--quiet"]);
    write_recipe(&root, "libx", &[("1.0", "all")]);
    write_recipe(&root, "liby", &[("1.0", "all")]);
    git_commit_all(&root, "initial recipes");
    let head = git_head(&root);

    let packages = modified_packages(&root, "recipes", &[head]).expect("must resolve");
    assert_eq!(
        packages.into_iter().collect::<Vec<_>>(),
        vec!["libx", "liby"]
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn modified_packages_rejects_unknown_commit() {
    let root = test_workspace_root();
    fs::create_dir_all(&root).expect("must create root");
    git_run(&root, &["init", "--quiet"]);
    write_recipe(&root, "libx", &[("1.0", "all")]);
    git_commit_all(&root, "initial recipes");

    let err = modified_packages(&root, "recipes", &["0123456789abcdef0123456789abcdef01234567"])
        .expect_err("unknown commit must fail");
    assert!(
        err.to_string().contains("git diff-tree failed"),
        "unexpected error: {err}"
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn graph_document_records_edges_between_catalogued_packages() {
    let catalog = catalog_of(&[("libx", "2.0"), ("liby", "1.0"), ("app", "1.0")]);
    let document = GraphDocument::from_json_str(
        r#"{
  "graph": {
    "nodes": {
      "0": {
        "ref": "conanfile",
        "name": null,
        "dependencies": { "1": { "ref": "app/1.0" } }
      },
      "1": {
        "ref": "app/1.0#f00",
        "name": "app",
        "dependencies": {
          "2": { "ref": "liby/1.0" },
          "3": { "ref": "zlib/1.3.1#abc" }
        }
      },
      "2": {
        "ref": "liby/1.0",
        "name": "liby",
        "dependencies": { "4": { "ref": "libx/2.0" } }
      }
    }
  }
}"#,
    )
    .expect("graph must parse");

    let mut dependents = tierkit_core::DependentsMap::new();
    let added = document.collect_dependents(&catalog, &mut dependents);

    assert_eq!(added, 2);
    assert_eq!(
        dependents.dependents_of("libx").iter().collect::<Vec<_>>(),
        vec!["liby"]
    );
    assert_eq!(
        dependents.dependents_of("liby").iter().collect::<Vec<_>>(),
        vec!["app"]
    );
    assert!(dependents.dependents_of("zlib").is_empty());
}

#[test]
fn load_dependents_accumulates_multiple_documents() {
    let root = test_workspace_root();
    fs::create_dir_all(&root).expect("must create root");
    let catalog = catalog_of(&[("libx", "2.0"), ("liby", "1.0"), ("libz", "1.0")]);
    let first = root.join("first.json");
    let second = root.join("second.json");
    fs::write(
        &first,
        r#"{"graph":{"nodes":{"1":{"name":"liby","dependencies":{"2":{"ref":"libx/2.0"}}}}}}"#,
    )
    .expect("must write graph");
    fs::write(
        &second,
        r#"{"graph":{"nodes":{"1":{"ref":"libz/1.0","dependencies":{"2":{"ref":"libx/1.0"}}}}}}"#,
    )
    .expect("must write graph");

    let dependents = load_dependents(&catalog, &[&first, &second]).expect("graphs must load");
    assert_eq!(
        dependents.dependents_of("libx").iter().collect::<Vec<_>>(),
        vec!["liby", "libz"]
    );

    let _ = fs::remove_dir_all(&root);
}

#[test]
fn load_dependents_reports_malformed_document() {
    let root = test_workspace_root();
    fs::create_dir_all(&root).expect("must create root");
    let path = root.join("graph.json");
    fs::write(&path, r#"{"nodes": {}}"#).expect("must write graph");

    let err = load_dependents(&Catalog::new(), &[&path]).expect_err("must reject");
    assert!(err.to_string().contains("invalid dependency graph"));

    let _ = fs::remove_dir_all(&root);
}

fn catalog_of(entries: &[(&str, &str)]) -> Catalog {
    let mut catalog = Catalog::new();
    for (name, version) in entries {
        catalog.insert(PackageInfo::new(
            name,
            RecipeVersion::new(*version),
            PathBuf::from("recipes").join(name).join("all"),
        ));
    }
    catalog
}

fn write_recipe(root: &Path, name: &str, versions: &[(&str, &str)]) {
    let package_dir = root.join("recipes").join(name);
    let mut config = String::from("versions:\n");
    for (version, folder) in versions {
        config.push_str(&format!("  \"{version}\":\n    folder: {folder}\n"));
        let recipe_dir = package_dir.join(folder);
        fs::create_dir_all(recipe_dir.join("test_package")).expect("must create recipe dir");
        fs::write(recipe_dir.join("conanfile.py"), "# recipe\n").expect("must write conanfile");
        fs::write(
            recipe_dir.join("test_package").join("conanfile.py"),
            "# test recipe\n",
        )
        .expect("must write test conanfile");
    }
    fs::write(package_dir.join(RECIPE_CONFIG_FILE), config).expect("must write config");
}

fn git_head(repo_root: &Path) -> String {
    let output = Command::new("git")
        .arg("rev-parse")
        .arg("HEAD")
        .current_dir(repo_root)
        .output()
        .expect("git must run rev-parse");
    assert!(
        output.status.success(),
        "git rev-parse failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout)
        .expect("git rev-parse output must be UTF-8")
        .trim()
        .to_string()
}

fn git_commit_all(repo_root: &Path, message: &str) {
    git_run(repo_root, &["add", "."]);
    git_run(
        repo_root,
        &[
            "-c",
            "user.name=Tierkit Tests",
            "-c",
            "user.email=tierkit-tests@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "--quiet",
            "-m",
            message,
        ],
    );
}

fn git_run(repo_root: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_root)
        .output()
        .expect("git command must execute");
    assert!(
        output.status.success(),
        "git command failed: git {}\nstdout:\n{}\nstderr:\n{}",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn test_workspace_root() -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let counter = TEST_ROOT_COUNTER.fetch_add(1, Ordering::SeqCst);
    path.push(format!(
        "tierkit-catalog-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        counter
    ));
    path
}
