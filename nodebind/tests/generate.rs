//! End-to-end generation over a project directory.

use nodebind::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

const ACTOR: &str = r#"using Godot;
using Game.Services;

namespace Game.Core;

public abstract partial class Actor : CharacterBody2D
{
    [InjectDependency] protected EventBus bus;
    [SceneNode("Body/Sprite")] protected Sprite2D sprite;
}
"#;

const PLAYER: &str = r#"using Godot;
using Game.Core;

namespace Game.Actors;

public partial class Player : Actor
{
    [InjectDependency] private GameState state;
    [SceneNode("Hud/Score")] private Label score;

    public override void _Ready()
    {
        ResolveDependencies();
        ResolveNodes();
    }
}
"#;

const SERVICES: &str = r#"namespace Game.Services
{
    public class EventBus { }
    public class GameState { }
}
"#;

const VENDORED: &str = r#"namespace Plugin;

public partial class Gizmo : Node
{
    [SceneNode("Handle")] private Node2D handle;
}
"#;

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let scripts = dir.path().join("scripts");
    fs::create_dir_all(scripts.join("core")).unwrap();
    fs::create_dir_all(dir.path().join("addons/plugin")).unwrap();
    fs::write(scripts.join("core/Actor.cs"), ACTOR).unwrap();
    fs::write(scripts.join("Player.cs"), PLAYER).unwrap();
    fs::write(scripts.join("Services.cs"), SERVICES).unwrap();
    fs::write(dir.path().join("addons/plugin/Gizmo.cs"), VENDORED).unwrap();
    dir
}

#[test]
fn test_generate_dir_writes_units() {
    let dir = project();
    let out = dir.path().join("generated");

    let report = generate_dir(dir.path(), &out, &RunConfig::default()).expect("generate failed");
    assert!(report.is_success());
    assert_eq!(
        report.written,
        vec![
            out.join("Game.Actors_Player_DependencyResolver.g.cs"),
            out.join("Game.Core_Actor_DependencyResolver.g.cs"),
            out.join("Game.Actors_Player_SceneNodeResolver.g.cs"),
            out.join("Game.Core_Actor_SceneNodeResolver.g.cs"),
        ]
    );

    let dependency = fs::read_to_string(&report.written[0]).unwrap();
    let expected = "namespace Game.Actors;\n\
        \n\
        using Godot;\n\
        using Game.Core;\n\
        using Game.Services;\n\
        #pragma warning disable CS0105 // Disable warning about redundant using directive\n\
        using Codartesien.SourceGenerators.DependencyResolver;\n\
        using System.Linq;\n\
        #pragma warning restore CS0105\n\
        \n\
        public partial class Player : IDependencyResolver\n\
        {\n\
        #pragma warning disable CS0109 // Disable warning about redundant 'new' keyword\n\
        \x20   public new void ResolveDependencies()\n\
        \x20   {\n\
        \x20       this.state = GetTree().Root.GetChildren().OfType<GameState>().FirstOrDefault();\n\
        \x20       this.bus = GetTree().Root.GetChildren().OfType<EventBus>().FirstOrDefault();\n\
        \x20   }\n\
        #pragma warning restore CS0109\n\
        }\n";
    assert_eq!(dependency, expected);

    let scene = fs::read_to_string(&report.written[2]).unwrap();
    assert!(scene.contains(
        "        this.score = this.GetNode<Label>(\"Hud/Score\");\n        this.sprite = this.GetNode<Sprite2D>(\"Body/Sprite\");\n"
    ));
    assert!(scene.contains("public partial class Player : ISceneNodeResolver\n"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let dir = project();
    let first_out = dir.path().join("first");
    let second_out = dir.path().join("second");

    let first = generate_dir(dir.path(), &first_out, &RunConfig::default()).expect("first run");
    // The first run's output now sits inside the source directory as .g.cs files.
    let second = generate_dir(dir.path(), &second_out, &RunConfig::default()).expect("second run");

    assert_eq!(first.written.len(), second.written.len());
    for (a, b) in first.written.iter().zip(&second.written) {
        assert_eq!(a.file_name(), b.file_name());
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn test_vendored_candidates_can_be_included() {
    let dir = project();
    let out = dir.path().join("generated");
    let config = RunConfig::default()
        .only(GeneratorKind::SceneNode)
        .with_vendored_segment("vendor/");

    let report = generate_dir(dir.path(), &out, &config).expect("generate failed");
    let names: Vec<&str> = report.outputs[0].hint_names();
    assert_eq!(
        names,
        vec![
            "Plugin_Gizmo_SceneNodeResolver.g",
            "Game.Actors_Player_SceneNodeResolver.g",
            "Game.Core_Actor_SceneNodeResolver.g",
        ]
    );
}

#[test]
fn test_failed_candidates_do_not_block_writes() {
    let dir = project();
    fs::write(
        dir.path().join("scripts/Loop.cs"),
        "public partial class Ping : Pong { [InjectDependency] private A a; }\npublic class Pong : Ping { }",
    )
    .unwrap();
    let out = dir.path().join("generated");
    let config = RunConfig::default().only(GeneratorKind::Dependency);

    let report = generate_dir(dir.path(), &out, &config).expect("generate failed");
    assert!(!report.is_success());
    assert_eq!(report.errors().count(), 1);
    assert_eq!(report.units(), 2);
    assert!(out.join("Game.Actors_Player_DependencyResolver.g.cs").exists());
}

#[test]
fn test_same_kind_generators_do_not_overwrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("Player.cs"),
        "public partial class Player { [InjectDependency] private A a; [Inject] private B b; }",
    )
    .unwrap();
    let out = dir.path().join("generated");
    let config = RunConfig::from_toml_str(
        r#"
        [[generator]]
        kind = "dependency"

        [[generator]]
        kind = "dependency"
        marker = "Inject"
        "#,
    )
    .expect("Failed to parse");

    let report = generate_dir(dir.path(), &out, &config).expect("generate failed");
    assert!(!report.is_success());
    assert_eq!(
        report.written,
        vec![out.join("Global_Player_DependencyResolver.g.cs")]
    );
    assert!(matches!(
        report.errors().next(),
        Some(CandidateError::HintNameCollision { .. })
    ));
    let text = fs::read_to_string(&report.written[0]).unwrap();
    assert!(text.contains("this.a = "));
    assert!(!text.contains("this.b = "));
}

#[test]
fn test_split_partial_class_generates_one_unit() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("Player.cs"),
        "namespace Game;\npublic partial class Player : Node { [SceneNode(\"Sprite\")] private Sprite2D sprite; }",
    )
    .unwrap();
    fs::write(
        dir.path().join("Player.Hud.cs"),
        "namespace Game;\npublic partial class Player { [SceneNode(\"Hud/Label\")] private Label label; }",
    )
    .unwrap();
    let out = dir.path().join("generated");
    let config = RunConfig::default().only(GeneratorKind::SceneNode);

    let report = generate_dir(dir.path(), &out, &config).expect("generate failed");
    assert!(report.is_success());
    assert_eq!(report.written, vec![out.join("Game_Player_SceneNodeResolver.g.cs")]);
    let text = fs::read_to_string(&report.written[0]).unwrap();
    assert!(text.contains("this.sprite = "));
    assert!(text.contains("this.label = "));
}

fn nodebind() -> Command {
    Command::new(PathBuf::from(env!("CARGO_BIN_EXE_nodebind")))
}

#[test]
fn test_cli_generate_and_list() {
    let dir = project();
    let out = dir.path().join("generated");

    let status = nodebind()
        .arg("generate")
        .arg(dir.path())
        .arg("--out")
        .arg(&out)
        .args(["--kind", "scene-node", "--sequential"])
        .status()
        .expect("failed to run nodebind");
    assert!(status.success());
    assert!(out.join("Game.Actors_Player_SceneNodeResolver.g.cs").exists());
    assert!(!out.join("Game.Actors_Player_DependencyResolver.g.cs").exists());

    let listed = nodebind()
        .arg("list")
        .arg(dir.path())
        .output()
        .expect("failed to run nodebind");
    assert!(listed.status.success());
    assert_eq!(
        String::from_utf8_lossy(&listed.stdout),
        "Game.Actors_Player_DependencyResolver.g\n\
         Game.Core_Actor_DependencyResolver.g\n\
         Game.Actors_Player_SceneNodeResolver.g\n\
         Game.Core_Actor_SceneNodeResolver.g\n"
    );
}

#[test]
fn test_cli_exit_code_on_failed_candidate() {
    let dir = project();
    fs::write(
        dir.path().join("scripts/Open.cs"),
        "public partial class Open<T> { [InjectDependency] private T value; }",
    )
    .unwrap();

    let status = nodebind()
        .arg("generate")
        .arg(dir.path())
        .arg("--out")
        .arg(dir.path().join("generated"))
        .status()
        .expect("failed to run nodebind");
    assert!(!status.success());
}

#[test]
fn test_cli_debug_dump() {
    let dir = project();
    let dump = dir.path().join("dump.txt");

    let status = nodebind()
        .arg("generate")
        .arg(dir.path())
        .arg("--out")
        .arg(dir.path().join("generated"))
        .args(["--kind", "dependency"])
        .arg("--debug-dump")
        .arg(&dump)
        .status()
        .expect("failed to run nodebind");
    assert!(status.success());

    let text = fs::read_to_string(&dump).expect("dump missing");
    assert!(text.starts_with("=== GENERATION RUN ===\n"));
    assert!(text.contains("Found 2 fields for class Player: state, bus\n"));
    assert!(text.contains("Classes looked at: Game.Actors.Player, Game.Core.Actor\n"));
}
