#![allow(dead_code)]

use spath::Settings;
use spath::commands::Workspace;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub struct TestProject {
    pub dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    /// The shop module used by most integration tests.
    pub fn shop() -> Self {
        let project = Self::new();
        project.add_file("go.mod", "module example.com/shop\n\ngo 1.22\n");
        project.add_file("store/store.go", sample_code::STORE);
        project.add_file("internal/legacy/item.go", sample_code::LEGACY);
        project.add_file("internal/util/util.go", sample_code::UTIL);
        project.add_file("cmd/shop/main.go", sample_code::MAIN);
        project.add_file("store/store_test.go", sample_code::STORE_TEST);
        project.add_file("testdata/fixture/fixture.go", "package fixture\n\nfunc Fixture() {}\n");
        project.add_file(
            "vendor/github.com/acme/log/log.go",
            "package log\n\nfunc Printf(format string, args ...any) {}\n",
        );
        project
    }

    /// The shop sources under a versioned module path, `example.com/shop.v2`.
    pub fn versioned_shop() -> Self {
        let project = Self::new();
        project.add_file("go.mod", "module example.com/shop.v2\n\ngo 1.22\n");
        project.add_file("shop.go", "package shop\n\n// Version of the module.\nconst Version = \"v2\"\n");
        project.add_file("store/store.go", sample_code::STORE);
        project.add_file("internal/legacy/item.go", sample_code::LEGACY);
        project.add_file("internal/util/util.go", sample_code::UTIL);
        project
    }

    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn workspace(&self) -> Workspace {
        self.workspace_with(Settings::default())
    }

    pub fn workspace_with(&self, settings: Settings) -> Workspace {
        Workspace::load(self.path(), settings).expect("Failed to load workspace")
    }
}

/// Shared in-memory writer for capturing `OutputManager` output.
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Buffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.contents()).expect("output is not JSON")
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub mod sample_code {
    pub const STORE: &str = r#"package store

import "errors"

// ErrMissing is returned when a key is absent.
var ErrMissing = errors.New("missing")

// DefaultSize is the initial capacity.
const DefaultSize = 16

// Item is one stored value.
type Item struct {
	// ID identifies the item.
	ID    string `json:"id" db:"item_id"`
	Price int    `json:"price,omitempty"`
}

type Base struct{}

// Store keeps items in memory.
type Store struct {
	Base
	items map[string]Item
	Name  string `json:"name"`
}

// Getter reads items.
type Getter interface {
	Get(key string) (Item, error)
}

// New builds an empty store.
func New(name string) *Store {
	return &Store{Name: name, items: make(map[string]Item, DefaultSize)}
}

// Get returns an item.
func (s *Store) Get(key string) (Item, error) {
	item, ok := s.items[key]
	if !ok {
		return Item{}, ErrMissing
	}
	return item, nil
}

func (s *Store) Put(item Item) {
	s.items[item.ID] = item
}

func Keys[K comparable, V any](m map[K]V) []K {
	out := make([]K, 0, len(m))
	for k := range m {
		out = append(out, k)
	}
	return out
}
"#;

    pub const LEGACY: &str = r#"package legacy

// Item predates store.Item.
type Item struct {
	Name string
}

func convert(i Item) string {
	return i.Name
}
"#;

    pub const UTIL: &str = r#"package util

// Clamp bounds v to [lo, hi].
func Clamp(v, lo, hi int) int {
	if v < lo {
		return lo
	}
	if v > hi {
		return hi
	}
	return v
}

func unused() {}
"#;

    pub const MAIN: &str = r#"package main

import "example.com/shop/store"

func main() {
	s := store.New("shop")
	s.Put(store.Item{ID: "a"})
}
"#;

    pub const STORE_TEST: &str = r#"package store

import "testing"

func TestGet(t *testing.T) {
	s := New("t")
	if _, err := s.Get("x"); err == nil {
		t.Fatal("expected error")
	}
}
"#;
}
